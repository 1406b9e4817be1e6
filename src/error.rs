//! # 错误类型模块
//!
//! 定义核心模块共用的错误分类，以及每一类错误对应的进程退出码。

use std::io;
use thiserror::Error;

/// 核心模块的结果类型。
pub type Result<T> = std::result::Result<T, BmpError>;

/// 读取、变换和写出 BMP 图像时可能出现的错误。
#[derive(Error, Debug)]
pub enum BmpError {
    /// 文件不存在，或打开、读取、写入、定位失败。
    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// 魔数不是 "BM"。
    #[error("File is not a valid BMP format (magic number 0x{magic:X})")]
    NotBmp { magic: u16 },

    /// 可用字节不足以解码 54 字节的文件头。
    #[error("BMP header is truncated: expected 54 bytes, got {len}")]
    TruncatedHeader { len: usize },

    /// 文件头中的偏移量、尺寸等字段自相矛盾。
    #[error("Invalid BMP layout: {reason}")]
    InvalidLayout { reason: String },

    /// 像素数据不足以容纳文件头声明的行数。
    #[error("Pixel data is truncated: {required} bytes required, {available} available")]
    PixelDataTruncated { required: usize, available: usize },

    /// 合法的 BMP，但不是 24 位无压缩格式。
    #[error(
        "This operation only supports uncompressed 24-bit BMP (found {bits_per_pixel}-bit, compression {compression})"
    )]
    UnsupportedFormat { bits_per_pixel: u16, compression: u32 },

    /// 载体字节不足以容纳消息。
    #[error("Message is too long for carrier: {required} bits required, {available} available")]
    CapacityExceeded { required: usize, available: usize },

    /// 消息超过长度上限。
    #[error("Message is too long: {len} bytes, at most {max} allowed")]
    MessageTooLong { len: usize, max: usize },

    /// 像素缓冲区分配失败。
    #[error("Image data memory allocation of {size} bytes failed")]
    AllocationFailure { size: usize },
}

impl BmpError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        BmpError::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn layout(reason: impl Into<String>) -> Self {
        BmpError::InvalidLayout {
            reason: reason.into(),
        }
    }

    /// 进程退出码：1 表示 I/O 类错误，2 表示格式、容量等参数类错误，3 表示内存分配失败。
    pub fn exit_code(&self) -> u8 {
        match self {
            BmpError::Io { .. } => 1,
            BmpError::NotBmp { .. }
            | BmpError::TruncatedHeader { .. }
            | BmpError::InvalidLayout { .. }
            | BmpError::PixelDataTruncated { .. }
            | BmpError::UnsupportedFormat { .. }
            | BmpError::CapacityExceeded { .. }
            | BmpError::MessageTooLong { .. } => 2,
            BmpError::AllocationFailure { .. } => 3,
        }
    }
}
