//! # 命令处理逻辑模块
//!
//! 包含各子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、调用核心算法以及向用户报告结果。

use crate::bmp::{BmpImage, read_bmp_file, write_bmp_file};
use crate::cli::{DecodeArgs, DumpArgs, EncodeArgs, GrayscaleArgs, InfoArgs};
use crate::error::BmpError;
use crate::grayscale::convert_to_grayscale;
use crate::hexdump::hex_dump;
use crate::message::read_message_file;
use crate::pixels::{row_padding, row_stride};
use crate::steganography::{capacity, decode_message, encode_message};
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// 处理 'Info' 命令：打印文件头各字段，以及推导出的行布局与隐写容量。
pub fn handle_info(args: InfoArgs) -> Result<()> {
    let image = read_bmp_file(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    println!("\n--- BMP file header information ---");
    print!("{}", info_report(&image));

    Ok(())
}

/// 生成 'Info' 命令的报告：文件头各字段，随后是行步长、像素数据大小和隐写容量。
pub fn info_report(image: &BmpImage) -> String {
    let mut report = format!("{}\n", image.header);

    if let Ok(width) = usize::try_from(image.header.width_px) {
        report.push_str(&format!(
            "row stride: {} bytes ({} padding)\n",
            row_stride(width),
            row_padding(width)
        ));
    }
    report.push_str(&format!("pixel data size: {} bytes\n", image.data_size()));
    report.push_str(&format!(
        "message capacity: {} bytes\n",
        capacity(image.data_size())
    ));

    report
}

/// 处理 'Dump' 命令：以十六进制加 ASCII 的形式打印文件头和像素数据。
pub fn handle_dump(args: DumpArgs) -> Result<()> {
    let image = read_bmp_file(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    println!("\n--- BMP file data (hex dump) ---");
    print!("{}", hex_dump(&image));

    Ok(())
}

/// 处理 'Grayscale' 命令的执行逻辑。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入图像，或图像不是 24 位无压缩 BMP。
/// * 目标文件已存在且未指定 `--force`。
/// * 无法写入目标文件。
pub fn handle_grayscale(args: GrayscaleArgs) -> Result<()> {
    let dest = args
        .dest
        .unwrap_or_else(|| sibling_with_prefix(&args.image, "gray_"));
    ensure_writable(&dest, args.force)?;

    let mut image = read_bmp_file(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    convert_to_grayscale(&mut image).with_context(|| {
        format!(
            "Failed to convert {} to grayscale.",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    write_bmp_file(&dest, &image).with_context(|| {
        format!(
            "Unable to write to target image file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The grayscale image has been saved: {}",
        dest.to_string_lossy().green().bold()
    );
    Ok(())
}

/// 处理 'Encode' 命令的执行逻辑。
///
/// 读取载体图像和消息文件的第一行，检查容量后隐藏消息，最后写出结果图像。
/// 任何一步失败都不会留下输出文件。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入的图像或消息文件。
/// * 消息超过 255 字节，或图像没有足够的空间。
/// * 目标文件已存在且未指定 `--force`。
/// * 无法写入目标图像文件。
pub fn handle_encode(args: EncodeArgs) -> Result<()> {
    let dest = args
        .dest
        .unwrap_or_else(|| sibling_with_prefix(&args.image, "doctored_"));
    ensure_writable(&dest, args.force)?;

    let mut image = read_bmp_file(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let message = read_message_file(&args.text).with_context(|| {
        format!(
            "Unable to read text file: {}",
            args.text.to_string_lossy().red().bold()
        )
    })?;

    encode_message(&mut image, &message).with_context(|| {
        format!(
            "Failed to hide the message in the image. \nMessage: {} bytes, Capacity: {} bytes",
            message.len().to_string().red().bold(),
            capacity(image.data_size()).to_string().green().bold()
        )
    })?;

    write_bmp_file(&dest, &image).with_context(|| {
        format!(
            "Unable to write to target image file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The message has been successfully hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );
    Ok(())
}

/// 处理 'Decode' 命令的执行逻辑。
///
/// 打印解码出的消息；若指定了 `--text`，同时把原始字节写入该文件。
pub fn handle_decode(args: DecodeArgs) -> Result<()> {
    if let Some(text) = &args.text {
        ensure_writable(text, args.force)?;
    }

    let image = read_bmp_file(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let message = decode_message(&image).with_context(|| {
        format!(
            "Failed to recover the message from '{}'. \nThe image may not contain a hidden message or is corrupted.",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    println!("Decoded message length: {} bytes", message.len());
    println!("Hidden message: \"{}\"", String::from_utf8_lossy(&message));

    if let Some(text) = &args.text {
        fs::write(text, &message)
            .map_err(|e| BmpError::io(format!("Unable to write file '{}'", text.display()), e))
            .with_context(|| {
                format!(
                    "Unable to write to target text file: {}",
                    text.to_string_lossy().red().bold()
                )
            })?;
        println!(
            "The message has been saved: {}",
            text.to_string_lossy().green().bold()
        );
    }

    Ok(())
}

/// 在输入文件所在目录下生成带前缀的输出路径，例如 `dir/doctored_cat.bmp`。
fn sibling_with_prefix(input: &Path, prefix: &str) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image.bmp".to_string());
    input.with_file_name(format!("{prefix}{name}"))
}

fn ensure_writable(dest: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !dest.exists(),
        "Output file already exists: {} (use --force to overwrite)",
        dest.to_string_lossy().red().bold()
    );
    Ok(())
}
