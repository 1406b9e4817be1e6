//! # BMP 读写模块
//!
//! 组合文件头编解码与像素缓冲区：读取器产出经过校验的 [`BmpImage`]，
//! 写出器把它原样 (文件头、头后间隙、像素数据) 写回字节流。

use crate::constants::{BMP_HEADER_SIZE, INFO_HEADER_SIZE};
use crate::error::{BmpError, Result};
use crate::header::{BmpHeader, decode_header, encode_header};
use crate::pixels::{PixelBuffer, pixel_data_size, try_alloc_bytes};
use log::{debug, warn};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// 内存中的一幅图像：文件头、头与像素之间的间隙字节，以及像素数据。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BmpImage {
    pub header: BmpHeader,
    /// 第 54 字节到 `offset` 之间的原始字节 (例如扩展的 DIB 字段)，写回时保持不变。
    pub gap: Vec<u8>,
    pub pixels: PixelBuffer,
}

impl BmpImage {
    pub fn new(header: BmpHeader, pixels: PixelBuffer) -> Self {
        Self {
            header,
            gap: Vec::new(),
            pixels,
        }
    }

    /// 像素数据字节数，即可用的载体字节数。
    pub fn data_size(&self) -> usize {
        self.pixels.len()
    }
}

/// 从字节流读取一幅 24 位无压缩 BMP。
///
/// # Errors
///
/// * 读取或定位失败：[`BmpError::Io`]
/// * 魔数错误：[`BmpError::NotBmp`]
/// * 位深或压缩方式不受支持：[`BmpError::UnsupportedFormat`]
/// * 偏移量与文件大小矛盾：[`BmpError::InvalidLayout`]
/// * 像素缓冲区分配失败：[`BmpError::AllocationFailure`]
pub fn read_bmp<R: Read + Seek>(reader: &mut R) -> Result<BmpImage> {
    let mut raw = [0u8; BMP_HEADER_SIZE];
    reader
        .read_exact(&mut raw)
        .map_err(|e| BmpError::io("Error reading BMP header", e))?;

    let header = decode_header(&raw)?;
    header.validate()?;

    if header.dib_header_size != INFO_HEADER_SIZE {
        warn!(
            "DIB header size is {} bytes, only the first {} are interpreted",
            header.dib_header_size, INFO_HEADER_SIZE
        );
    }

    let offset = header.offset as usize;
    if offset < BMP_HEADER_SIZE {
        return Err(BmpError::layout(format!(
            "pixel data offset {offset} overlaps the {BMP_HEADER_SIZE}-byte header"
        )));
    }
    let data_size = pixel_data_size(&header)?;

    // 分配之前先确认流中确实有这么多字节，不信任文件头声明的大小
    let stream_len = reader
        .seek(SeekFrom::End(0))
        .map_err(|e| BmpError::io("Error seeking to end of file", e))?;
    if stream_len < u64::from(header.offset) {
        return Err(short_read(
            "Error reading data between header and pixel array",
            u64::from(header.offset),
            stream_len,
        ));
    }
    if stream_len < u64::from(header.size) {
        return Err(short_read("Error reading image data", u64::from(header.size), stream_len));
    }

    reader
        .seek(SeekFrom::Start(BMP_HEADER_SIZE as u64))
        .map_err(|e| BmpError::io("Error seeking past BMP header", e))?;
    let gap = read_bytes(
        reader,
        offset - BMP_HEADER_SIZE,
        "Error reading data between header and pixel array",
    )?;

    reader
        .seek(SeekFrom::Start(u64::from(header.offset)))
        .map_err(|e| BmpError::io("Error seeking to image data offset", e))?;
    let pixels = PixelBuffer::from_vec(read_bytes(reader, data_size, "Error reading image data")?);

    debug!(
        "read {} BMP {}x{} with {} bytes of pixel data at offset {}",
        if header.is_top_down() { "top-down" } else { "bottom-up" },
        header.width_px,
        header.row_count(),
        data_size,
        offset
    );

    Ok(BmpImage {
        header,
        gap,
        pixels,
    })
}

/// 把图像写入字节流：文件头、间隙，然后在 `offset` 处写入像素数据。
///
/// # Errors
///
/// 写入或定位失败时返回 [`BmpError::Io`]；像素数据长度与文件头不符时返回
/// [`BmpError::InvalidLayout`]。
pub fn write_bmp<W: Write + Seek>(writer: &mut W, image: &BmpImage) -> Result<()> {
    let data_size = pixel_data_size(&image.header)?;
    if image.pixels.len() != data_size {
        return Err(BmpError::layout(format!(
            "header declares {} bytes of pixel data but buffer holds {}",
            data_size,
            image.pixels.len()
        )));
    }

    writer
        .write_all(&encode_header(&image.header))
        .map_err(|e| BmpError::io("Error writing BMP header", e))?;
    writer
        .write_all(&image.gap)
        .map_err(|e| BmpError::io("Error writing data between header and pixel array", e))?;
    writer
        .seek(SeekFrom::Start(u64::from(image.header.offset)))
        .map_err(|e| BmpError::io("Error seeking to image data offset", e))?;
    writer
        .write_all(image.pixels.as_bytes())
        .map_err(|e| BmpError::io("Error writing image data", e))?;
    writer
        .flush()
        .map_err(|e| BmpError::io("Error flushing image data", e))?;

    debug!(
        "wrote BMP with {} bytes of pixel data at offset {}",
        data_size, image.header.offset
    );
    Ok(())
}

/// 打开并读取 `path` 处的 BMP 文件。
pub fn read_bmp_file(path: &Path) -> Result<BmpImage> {
    let file = File::open(path).map_err(|e| open_error(path, e))?;
    read_bmp(&mut BufReader::new(file))
}

/// 把图像写入 `path`。
///
/// 先写入同目录下的临时文件，成功后再重命名为目标文件；
/// 写入失败时目标路径上已有的文件保持不变。
pub fn write_bmp_file(path: &Path, image: &BmpImage) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| {
        BmpError::io(format!("Unable to create file in '{}'", dir.display()), e)
    })?;

    write_bmp(&mut BufWriter::new(tmp.as_file_mut()), image)?;

    tmp.persist(path).map_err(|e| {
        BmpError::io(format!("Unable to create file '{}'", path.display()), e.error)
    })?;
    Ok(())
}

/// 读取恰好 `len` 个字节；容量按需预留，不提前清零。
fn read_bytes<R: Read>(reader: &mut R, len: usize, context: &str) -> Result<Vec<u8>> {
    let mut data = try_alloc_bytes(len)?;
    reader
        .by_ref()
        .take(len as u64)
        .read_to_end(&mut data)
        .map_err(|e| BmpError::io(context, e))?;

    if data.len() < len {
        return Err(short_read(context, len as u64, data.len() as u64));
    }
    Ok(data)
}

fn short_read(context: &str, expected: u64, available: u64) -> BmpError {
    BmpError::io(
        context,
        io::Error::new(
            ErrorKind::UnexpectedEof,
            format!("expected {expected} bytes, only {available} available"),
        ),
    )
}

fn open_error(path: &Path, source: io::Error) -> BmpError {
    let context = if source.kind() == ErrorKind::NotFound {
        format!("File not found: '{}'", path.display())
    } else {
        format!("Unable to open file '{}'", path.display())
    };
    BmpError::io(context, source)
}
