//! # 像素缓冲区模块
//!
//! 持有原始像素字节，并提供行步长与行填充的计算。
//! 每行由 `width * 3` 个 BGR 字节组成，随后补齐到 4 字节边界。

use crate::constants::BYTES_PER_PIXEL;
use crate::error::{BmpError, Result};
use crate::header::BmpHeader;

/// 每行末尾的填充字节数，取值范围为 `0..=3`。
pub fn row_padding(width_px: usize) -> usize {
    (4 - (width_px * BYTES_PER_PIXEL) % 4) % 4
}

/// 一行 (含填充) 占用的字节数，总是 4 的倍数。
pub fn row_stride(width_px: usize) -> usize {
    width_px * BYTES_PER_PIXEL + row_padding(width_px)
}

/// 像素数据的字节数：`size - offset`。
///
/// 这是读写像素数据时唯一采信的长度，`image_size_bytes` 可能为 0 或与实际不符。
pub fn pixel_data_size(header: &BmpHeader) -> Result<usize> {
    header
        .size
        .checked_sub(header.offset)
        .map(|n| n as usize)
        .ok_or_else(|| {
            BmpError::layout(format!(
                "pixel data offset {} lies beyond file size {}",
                header.offset, header.size
            ))
        })
}

/// 第 `row` 行第 `col` 个像素 (蓝色通道) 在缓冲区中的起始位置。
pub fn pixel_offset(width_px: usize, row: usize, col: usize) -> usize {
    row * row_stride(width_px) + col * BYTES_PER_PIXEL
}

/// 预留 `size` 字节容量的空缓冲区，页面不会被提前写入。
///
/// # Errors
///
/// 内存不足时返回 [`BmpError::AllocationFailure`]，而不是直接终止进程。
pub fn try_alloc_bytes(size: usize) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    data.try_reserve_exact(size)
        .map_err(|_| BmpError::AllocationFailure { size })?;
    Ok(data)
}

/// 图像独占的像素字节序列。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PixelBuffer {
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}
