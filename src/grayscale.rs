//! # 灰度转换模块
//!
//! 以绿色通道近似亮度：每个像素的蓝、红通道被改写为绿色通道的值，
//! 绿色通道与行填充字节保持不变。

use crate::bmp::BmpImage;
use crate::constants::BYTES_PER_PIXEL;
use crate::error::{BmpError, Result};
use crate::pixels::row_stride;
use log::info;

/// 原地把 24 位图像转换为灰度。
///
/// # Errors
///
/// * 不是 24 位无压缩格式：[`BmpError::UnsupportedFormat`]
/// * 宽度为负：[`BmpError::InvalidLayout`]
/// * 像素数据不足 `abs(height)` 行：[`BmpError::PixelDataTruncated`]，此时缓冲区未被修改
pub fn convert_to_grayscale(image: &mut BmpImage) -> Result<()> {
    let header = image.header;
    header.require_24bit_uncompressed()?;

    let width = usize::try_from(header.width_px)
        .map_err(|_| BmpError::layout(format!("negative image width {}", header.width_px)))?;
    let height = header.row_count();
    let stride = row_stride(width);
    let row_bytes = width * BYTES_PER_PIXEL;

    // 最后一行可以缺少填充字节
    let required = match height {
        0 => 0,
        h => (h - 1) * stride + row_bytes,
    };
    let data = image.pixels.as_bytes_mut();
    if data.len() < required {
        return Err(BmpError::PixelDataTruncated {
            required,
            available: data.len(),
        });
    }

    if stride > 0 {
        for row in data.chunks_mut(stride).take(height) {
            for pixel in row[..row_bytes].chunks_exact_mut(BYTES_PER_PIXEL) {
                let green = pixel[1];
                pixel[0] = green;
                pixel[2] = green;
            }
        }
    }

    info!("converted {width}x{height} pixels to grayscale");
    Ok(())
}
