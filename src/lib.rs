//! # bmpkit 库
//!
//! 本库包含 24 位无压缩 BMP 图像的编解码、十六进制转储、灰度转换与 LSB 隐写的核心逻辑。

// 声明库包含的所有模块。

pub mod bmp;
pub mod cli;
pub mod constants;
pub mod error;
pub mod grayscale;
pub mod handler;
pub mod header;
pub mod hexdump;
pub mod message;
pub mod pixels;
pub mod steganography;
