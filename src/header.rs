//! # BMP 文件头编解码模块
//!
//! 按固定顺序逐字段 (小端) 读写 54 字节的 BMP 文件头，不依赖任何内存布局。
//! 本模块只保证字节宽度正确；魔数、位深和压缩方式的语义校验由读取器在解码后立即完成。

use crate::constants::{BMP_HEADER_SIZE, BMP_MAGIC, COMPRESSION_NONE, SUPPORTED_BITS_PER_PIXEL};
use crate::error::{BmpError, Result};
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use std::fmt;
use std::io;

/// BITMAPFILEHEADER 与 BITMAPINFOHEADER 合并后的 54 字节记录。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BmpHeader {
    pub file_type: u16,
    pub size: u32,
    pub reserved1: u16,
    pub reserved2: u16,
    pub offset: u32,
    pub dib_header_size: u32,
    pub width_px: i32,
    /// 负值表示像素行自上而下存储。
    pub height_px: i32,
    pub num_planes: u16,
    pub bits_per_pixel: u16,
    pub compression: u32,
    pub image_size_bytes: u32,
    pub x_resolution_ppm: i32,
    pub y_resolution_ppm: i32,
    pub num_colors: u32,
    pub important_colors: u32,
}

impl BmpHeader {
    /// 检查魔数，以及是否为 24 位无压缩格式。
    pub fn validate(&self) -> Result<()> {
        if self.file_type != BMP_MAGIC {
            return Err(BmpError::NotBmp {
                magic: self.file_type,
            });
        }
        self.require_24bit_uncompressed()
    }

    /// 所有像素级操作的共同前提。
    pub fn require_24bit_uncompressed(&self) -> Result<()> {
        if self.bits_per_pixel != SUPPORTED_BITS_PER_PIXEL || self.compression != COMPRESSION_NONE {
            return Err(BmpError::UnsupportedFormat {
                bits_per_pixel: self.bits_per_pixel,
                compression: self.compression,
            });
        }
        Ok(())
    }

    /// 像素行数，与存储方向无关。
    pub fn row_count(&self) -> usize {
        self.height_px.unsigned_abs() as usize
    }

    pub fn is_top_down(&self) -> bool {
        self.height_px < 0
    }
}

/// 从 `bytes` 的前 54 个字节解码文件头。
///
/// # Errors
///
/// 字节数不足 54 时返回 [`BmpError::TruncatedHeader`]。
pub fn decode_header(bytes: &[u8]) -> Result<BmpHeader> {
    if bytes.len() < BMP_HEADER_SIZE {
        return Err(BmpError::TruncatedHeader { len: bytes.len() });
    }

    read_fields(&bytes[..BMP_HEADER_SIZE]).map_err(|_| BmpError::TruncatedHeader { len: bytes.len() })
}

fn read_fields(mut r: &[u8]) -> io::Result<BmpHeader> {
    Ok(BmpHeader {
        file_type: r.read_u16::<LittleEndian>()?,
        size: r.read_u32::<LittleEndian>()?,
        reserved1: r.read_u16::<LittleEndian>()?,
        reserved2: r.read_u16::<LittleEndian>()?,
        offset: r.read_u32::<LittleEndian>()?,
        dib_header_size: r.read_u32::<LittleEndian>()?,
        width_px: r.read_i32::<LittleEndian>()?,
        height_px: r.read_i32::<LittleEndian>()?,
        num_planes: r.read_u16::<LittleEndian>()?,
        bits_per_pixel: r.read_u16::<LittleEndian>()?,
        compression: r.read_u32::<LittleEndian>()?,
        image_size_bytes: r.read_u32::<LittleEndian>()?,
        x_resolution_ppm: r.read_i32::<LittleEndian>()?,
        y_resolution_ppm: r.read_i32::<LittleEndian>()?,
        num_colors: r.read_u32::<LittleEndian>()?,
        important_colors: r.read_u32::<LittleEndian>()?,
    })
}

/// 将文件头编码为恰好 54 个字节，字段顺序与 [`decode_header`] 相同。
pub fn encode_header(header: &BmpHeader) -> [u8; BMP_HEADER_SIZE] {
    let mut buf = [0u8; BMP_HEADER_SIZE];
    let mut w = FieldWriter { buf: &mut buf, pos: 0 };

    w.u16(header.file_type);
    w.u32(header.size);
    w.u16(header.reserved1);
    w.u16(header.reserved2);
    w.u32(header.offset);
    w.u32(header.dib_header_size);
    w.i32(header.width_px);
    w.i32(header.height_px);
    w.u16(header.num_planes);
    w.u16(header.bits_per_pixel);
    w.u32(header.compression);
    w.u32(header.image_size_bytes);
    w.i32(header.x_resolution_ppm);
    w.i32(header.y_resolution_ppm);
    w.u32(header.num_colors);
    w.u32(header.important_colors);
    debug_assert_eq!(w.pos, BMP_HEADER_SIZE);

    buf
}

struct FieldWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl FieldWriter<'_> {
    fn u16(&mut self, value: u16) {
        LittleEndian::write_u16(&mut self.buf[self.pos..self.pos + 2], value);
        self.pos += 2;
    }

    fn u32(&mut self, value: u32) {
        LittleEndian::write_u32(&mut self.buf[self.pos..self.pos + 4], value);
        self.pos += 4;
    }

    fn i32(&mut self, value: i32) {
        LittleEndian::write_i32(&mut self.buf[self.pos..self.pos + 4], value);
        self.pos += 4;
    }
}

impl fmt::Display for BmpHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "type: 0x{:04x}", self.file_type)?;
        writeln!(f, "size: {} bytes", self.size)?;
        writeln!(f, "reserved1: {}", self.reserved1)?;
        writeln!(f, "reserved2: {}", self.reserved2)?;
        writeln!(f, "offset: {} bytes", self.offset)?;
        writeln!(f, "DIB header size: {} bytes", self.dib_header_size)?;
        writeln!(f, "width: {} px", self.width_px)?;
        writeln!(f, "height: {} px", self.height_px)?;
        writeln!(f, "number of planes: {}", self.num_planes)?;
        writeln!(f, "bits per pixel: {}", self.bits_per_pixel)?;
        writeln!(f, "compression: {}", self.compression)?;
        writeln!(f, "image size: {} bytes", self.image_size_bytes)?;
        writeln!(f, "X resolution: {} ppm", self.x_resolution_ppm)?;
        writeln!(f, "Y resolution: {} ppm", self.y_resolution_ppm)?;
        writeln!(f, "number of colors: {}", self.num_colors)?;
        write!(f, "important colors: {}", self.important_colors)
    }
}
