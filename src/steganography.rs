//! # LSB 隐写模块
//!
//! 把像素数据当作一段平坦的载体字节 (行填充字节同样参与)，每个字节的最低位存 1 bit。
//! 布局：前 8 个字节存消息长度 (`u8`)，随后每 8 个字节存一个字符，均为低位在前。

use crate::bmp::BmpImage;
use crate::constants::{BYTES_PER_CHAR, LENGTH_HIDING_BYTES, MAX_MESSAGE_LENGTH};
use crate::error::{BmpError, Result};
use log::debug;

/// 把 `value` 的 8 个比特 (低位在前) 写入 `pix[dix..dix + 8]` 的最低位。
pub fn hide_byte(value: u8, pix: &mut [u8], dix: usize) -> Result<()> {
    let range = carrier_window(pix.len(), dix)?;

    for (i, byte) in pix[range].iter_mut().enumerate() {
        *byte = (*byte & 0xFE) | ((value >> i) & 1);
    }

    Ok(())
}

/// 从 `pix[dix..dix + 8]` 的最低位 (低位在前) 还原一个字节。
pub fn reveal_byte(pix: &[u8], dix: usize) -> Result<u8> {
    let range = carrier_window(pix.len(), dix)?;

    Ok(pix[range]
        .iter()
        .enumerate()
        .fold(0u8, |acc, (i, &byte)| acc | ((byte & 1) << i)))
}

fn carrier_window(len: usize, dix: usize) -> Result<std::ops::Range<usize>> {
    match dix.checked_add(BYTES_PER_CHAR) {
        Some(end) if end <= len => Ok(dix..end),
        _ => Err(BmpError::CapacityExceeded {
            required: dix.saturating_add(BYTES_PER_CHAR),
            available: len,
        }),
    }
}

/// 隐藏 `len` 个字符所需的载体字节数 (即比特数)。
pub fn required_bits(len: usize) -> usize {
    LENGTH_HIDING_BYTES + len * BYTES_PER_CHAR
}

/// `data_size` 个载体字节最多能容纳的消息长度。
pub fn capacity(data_size: usize) -> usize {
    (data_size.saturating_sub(LENGTH_HIDING_BYTES) / BYTES_PER_CHAR).min(MAX_MESSAGE_LENGTH)
}

/// 把 `message` 隐藏到图像的像素数据中。
///
/// # Errors
///
/// * 不是 24 位无压缩格式：[`BmpError::UnsupportedFormat`]
/// * 消息超过 255 字节：[`BmpError::MessageTooLong`]
/// * 载体字节不足：[`BmpError::CapacityExceeded`]
///
/// 以上错误都在修改任何像素字节之前返回。
pub fn encode_message(image: &mut BmpImage, message: &[u8]) -> Result<()> {
    image.header.require_24bit_uncompressed()?;

    let len = u8::try_from(message.len()).map_err(|_| BmpError::MessageTooLong {
        len: message.len(),
        max: MAX_MESSAGE_LENGTH,
    })?;

    let pix = image.pixels.as_bytes_mut();
    let required = required_bits(message.len());
    if required > pix.len() {
        return Err(BmpError::CapacityExceeded {
            required,
            available: pix.len(),
        });
    }

    hide_byte(len, pix, 0)?;
    message.iter().enumerate().try_for_each(|(i, &char_byte)| {
        hide_byte(char_byte, pix, LENGTH_HIDING_BYTES + BYTES_PER_CHAR * i)
    })?;

    debug!("hid {} message bytes in {} carrier bytes", len, pix.len());
    Ok(())
}

/// 从图像的像素数据中取出隐藏的消息 (恰好 `L` 个字节，不保证可打印)。
///
/// # Errors
///
/// * 不是 24 位无压缩格式：[`BmpError::UnsupportedFormat`]
/// * 长度字段或消息超出像素数据范围：[`BmpError::CapacityExceeded`]，通常说明图像中没有隐藏消息
pub fn decode_message(image: &BmpImage) -> Result<Vec<u8>> {
    image.header.require_24bit_uncompressed()?;

    let pix = image.pixels.as_bytes();
    let len = reveal_byte(pix, 0)? as usize;
    debug!("decoded message length: {len} bytes");

    (0..len)
        .map(|i| reveal_byte(pix, LENGTH_HIDING_BYTES + BYTES_PER_CHAR * i))
        .collect()
}
