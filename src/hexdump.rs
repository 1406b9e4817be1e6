//! # 十六进制转储模块
//!
//! 把文件头与像素数据视为一条连续的字节流，按每行 16 字节输出：
//! 8 位十六进制偏移、每 2 字节一组的十六进制值，以及对应的 ASCII 表示。

use crate::bmp::BmpImage;
use crate::constants::DUMP_ROW_WIDTH;
use crate::header::encode_header;

/// 渲染整幅图像 (54 字节文件头 + 像素数据) 的转储文本。
///
/// 头后间隙不在转储范围内，偏移量按 "文件头 + 像素数据" 的逻辑字节流计算。
pub fn hex_dump(image: &BmpImage) -> String {
    let header = encode_header(&image.header);
    render(header.iter().chain(image.pixels.as_bytes()).copied())
}

/// 渲染任意字节序列的转储文本，每行以换行符结尾。
pub fn render(bytes: impl IntoIterator<Item = u8>) -> String {
    let bytes: Vec<u8> = bytes.into_iter().collect();
    let mut out = String::new();

    for (row, chunk) in bytes.chunks(DUMP_ROW_WIDTH).enumerate() {
        out.push_str(&format!("{:08x}: ", row * DUMP_ROW_WIDTH));

        for slot in 0..DUMP_ROW_WIDTH {
            match chunk.get(slot) {
                Some(byte) => out.push_str(&format!("{byte:02x}")),
                None => out.push_str("  "),
            }
            if slot % 2 == 1 {
                out.push(' ');
            }
        }

        out.push_str("  |");
        out.extend(chunk.iter().map(|&b| printable(b)));
        out.push_str("|\n");
    }

    out
}

fn printable(byte: u8) -> char {
    if (0x20..=0x7e).contains(&byte) {
        byte as char
    } else {
        '.'
    }
}
