use bmpkit::{
    bmp::{BmpImage, read_bmp, read_bmp_file, write_bmp, write_bmp_file},
    constants::{BMP_HEADER_SIZE, BMP_MAGIC},
    error::BmpError,
    grayscale::convert_to_grayscale,
    handler::info_report,
    header::{BmpHeader, decode_header, encode_header},
    hexdump::hex_dump,
    message::read_message_line,
    pixels::{
        PixelBuffer, pixel_data_size, pixel_offset, row_padding, row_stride, try_alloc_bytes,
    },
    steganography::{capacity, decode_message, encode_message},
};
use rand::RngCore;
use std::fs;
use std::io::{Cursor, ErrorKind};
use tempfile::tempdir;

/// 构造一个 24 位无压缩、像素数据紧跟文件头的文件头
fn header_for(width: i32, height: i32) -> BmpHeader {
    let data = row_stride(width.unsigned_abs() as usize) * height.unsigned_abs() as usize;
    BmpHeader {
        file_type: BMP_MAGIC,
        size: (BMP_HEADER_SIZE + data) as u32,
        offset: BMP_HEADER_SIZE as u32,
        dib_header_size: 40,
        width_px: width,
        height_px: height,
        num_planes: 1,
        bits_per_pixel: 24,
        compression: 0,
        image_size_bytes: data as u32,
        ..Default::default()
    }
}

fn image_with(width: i32, height: i32, bytes: Vec<u8>) -> BmpImage {
    let header = header_for(width, height);
    assert_eq!(bytes.len(), pixel_data_size(&header).unwrap());
    BmpImage::new(header, PixelBuffer::from_vec(bytes))
}

fn random_image(width: i32, height: i32) -> BmpImage {
    let header = header_for(width, height);
    let mut bytes = vec![0u8; pixel_data_size(&header).unwrap()];
    rand::rng().fill_bytes(&mut bytes);
    BmpImage::new(header, PixelBuffer::from_vec(bytes))
}

fn to_bytes(image: &BmpImage) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    write_bmp(&mut cursor, image).unwrap();
    cursor.into_inner()
}

/// 验证文件头编码总是 54 字节，且解码后与原值一致
#[test]
fn test_header_round_trip() {
    let header = BmpHeader {
        file_type: BMP_MAGIC,
        size: 0x0102_0304,
        reserved1: 7,
        reserved2: 0xBEEF,
        offset: 138,
        dib_header_size: 124,
        width_px: 640,
        height_px: -480,
        num_planes: 1,
        bits_per_pixel: 24,
        compression: 0,
        image_size_bytes: 921_600,
        x_resolution_ppm: 2835,
        y_resolution_ppm: -1,
        num_colors: 3,
        important_colors: 4,
    };

    let bytes = encode_header(&header);
    assert_eq!(bytes.len(), BMP_HEADER_SIZE);
    assert_eq!(&bytes[0..2], b"BM");
    assert_eq!(&bytes[10..14], &138u32.to_le_bytes());
    assert_eq!(&bytes[22..26], &(-480i32).to_le_bytes());
    assert_eq!(decode_header(&bytes).unwrap(), header);
}

/// 验证字节数不足 54 时解码失败
#[test]
fn test_decode_truncated_header() {
    let bytes = encode_header(&header_for(1, 1));
    let result = decode_header(&bytes[..53]);
    assert!(matches!(result, Err(BmpError::TruncatedHeader { len: 53 })));
}

/// 验证行填充总能把行长度补齐到 4 的倍数
#[test]
fn test_row_padding() {
    for width in 0..256 {
        let padding = row_padding(width);
        assert!(padding <= 3);
        assert_eq!((width * 3 + padding) % 4, 0, "width {width}");
        assert_eq!(row_stride(width), width * 3 + padding);
    }
    assert_eq!(row_padding(1), 1);
    assert_eq!(row_padding(2), 2);
    assert_eq!(row_padding(3), 3);
    assert_eq!(row_padding(4), 0);
    assert_eq!(pixel_offset(2, 1, 1), 8 + 3);
}

/// 验证像素偏移按 "行步长 * 行 + 3 * 列" 计算
#[test]
fn test_pixel_offset() {
    assert_eq!(pixel_offset(0, 5, 0), 0);
    assert_eq!(pixel_offset(1, 0, 0), 0);
    assert_eq!(pixel_offset(1, 3, 0), 12);
    assert_eq!(pixel_offset(3, 0, 2), 6);
    assert_eq!(pixel_offset(3, 2, 1), 2 * 12 + 3);
    assert_eq!(pixel_offset(5, 1, 4), 16 + 12);
    for width in 1..20 {
        let last_in_row = pixel_offset(width, 0, width - 1) + 3;
        assert_eq!(pixel_offset(width, 1, 0) - last_in_row, row_padding(width));
    }
}

/// 验证文件头报告逐行使用固定的字段名与单位
#[test]
fn test_header_report_format() {
    let header = BmpHeader {
        x_resolution_ppm: 2835,
        y_resolution_ppm: -1,
        reserved2: 9,
        ..header_for(2, -2)
    };
    let expected = [
        "type: 0x4d42",
        "size: 70 bytes",
        "reserved1: 0",
        "reserved2: 9",
        "offset: 54 bytes",
        "DIB header size: 40 bytes",
        "width: 2 px",
        "height: -2 px",
        "number of planes: 1",
        "bits per pixel: 24",
        "compression: 0",
        "image size: 16 bytes",
        "X resolution: 2835 ppm",
        "Y resolution: -1 ppm",
        "number of colors: 0",
        "important colors: 0",
    ];

    let text = header.to_string();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines, expected);

    let report = info_report(&BmpImage::new(header, PixelBuffer::from_vec(vec![0; 16])));
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines[..16], expected);
    assert_eq!(
        lines[16..],
        [
            "row stride: 8 bytes (2 padding)",
            "pixel data size: 16 bytes",
            "message capacity: 1 bytes",
        ]
    );
}

/// 验证像素数据大小以 size - offset 为准，而不是 image_size_bytes
#[test]
fn test_pixel_data_size() {
    let mut header = header_for(2, 2);
    header.image_size_bytes = 0;
    assert_eq!(pixel_data_size(&header).unwrap(), 16);

    header.size = 10;
    assert!(matches!(
        pixel_data_size(&header),
        Err(BmpError::InvalidLayout { .. })
    ));
}

/// 验证读取后再写出得到完全相同的字节，包括文件头与像素之间的间隙
#[test]
fn test_read_write_preserves_gap() {
    let mut header = header_for(1, 2);
    header.offset = 58;
    header.size += 4;
    header.dib_header_size = 44;

    let mut file = encode_header(&header).to_vec();
    file.extend_from_slice(&[1, 2, 3, 4]);
    file.extend_from_slice(&[10, 20, 30, 0, 40, 50, 60, 0]);

    let image = read_bmp(&mut Cursor::new(file.clone())).unwrap();
    assert_eq!(image.header, header);
    assert_eq!(image.gap, vec![1, 2, 3, 4]);
    assert_eq!(image.pixels.as_bytes(), &[10, 20, 30, 0, 40, 50, 60, 0]);
    assert_eq!(to_bytes(&image), file);
}

/// 验证魔数错误、位深或压缩不受支持、偏移非法时读取失败
#[test]
fn test_read_rejects_invalid_headers() {
    let read = |header: BmpHeader| {
        let mut file = encode_header(&header).to_vec();
        file.resize(file.len() + 16, 0);
        read_bmp(&mut Cursor::new(file))
    };

    let mut header = header_for(2, 2);
    header.file_type = 0x4D43;
    assert!(matches!(read(header), Err(BmpError::NotBmp { magic: 0x4D43 })));

    let mut header = header_for(2, 2);
    header.bits_per_pixel = 32;
    assert!(matches!(
        read(header),
        Err(BmpError::UnsupportedFormat {
            bits_per_pixel: 32,
            ..
        })
    ));

    let mut header = header_for(2, 2);
    header.compression = 1;
    assert!(matches!(
        read(header),
        Err(BmpError::UnsupportedFormat { compression: 1, .. })
    ));

    let mut header = header_for(2, 2);
    header.offset = 20;
    assert!(matches!(read(header), Err(BmpError::InvalidLayout { .. })));
}

/// 验证文件头或像素数据不完整时返回 I/O 错误
#[test]
fn test_read_short_input() {
    let file = encode_header(&header_for(2, 2));
    let result = read_bmp(&mut Cursor::new(file[..40].to_vec()));
    assert!(matches!(result, Err(BmpError::Io { .. })));

    let mut file = file.to_vec();
    file.extend_from_slice(&[0u8; 15]);
    let result = read_bmp(&mut Cursor::new(file));
    assert!(matches!(result, Err(BmpError::Io { .. })));
}

/// 文件头声明的大小远超实际文件时，不预先分配内存，直接报告读取不完整
#[test]
fn test_read_oversized_declared_size() {
    let mut header = header_for(1, 1);
    header.size = 0xF000_0000;
    let mut file = encode_header(&header).to_vec();
    file.extend_from_slice(&[1, 2, 3, 4]);
    assert_eq!(file.len(), 58);

    let result = read_bmp(&mut Cursor::new(file));
    match result {
        Err(BmpError::Io { source, .. }) => assert_eq!(source.kind(), ErrorKind::UnexpectedEof),
        other => panic!("expected a short read, got {other:?}"),
    }

    // 间隙同理
    let mut header = header_for(1, 1);
    header.offset = 0xF000_0000;
    header.size = 0xF000_0004;
    let mut file = encode_header(&header).to_vec();
    file.extend_from_slice(&[0; 4]);

    let result = read_bmp(&mut Cursor::new(file));
    assert!(matches!(result, Err(BmpError::Io { .. })));
    assert_eq!(result.map_err(|e| e.exit_code()).err(), Some(1));
}

/// 预留的缓冲区为空，只有容量
#[test]
fn test_try_alloc_bytes() {
    let data = try_alloc_bytes(64).unwrap();
    assert!(data.is_empty());
    assert!(data.capacity() >= 64);
}

/// 写入失败时保留目标路径上已有的文件，成功时整体替换
#[test]
fn test_write_file_keeps_existing_on_failure() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("dest.bmp");
    fs::write(&dest, b"precious").unwrap();

    let broken = BmpImage::new(header_for(2, 2), PixelBuffer::from_vec(vec![0; 12]));
    let result = write_bmp_file(&dest, &broken);
    assert!(matches!(result, Err(BmpError::InvalidLayout { .. })));
    assert_eq!(fs::read(&dest).unwrap(), b"precious");
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);

    let image = random_image(3, 2);
    write_bmp_file(&dest, &image).unwrap();
    assert_eq!(read_bmp_file(&dest).unwrap(), image);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

/// 验证像素缓冲区长度与文件头不符时拒绝写出
#[test]
fn test_write_rejects_mismatched_buffer() {
    let image = BmpImage::new(header_for(2, 2), PixelBuffer::from_vec(vec![0; 12]));
    let result = write_bmp(&mut Cursor::new(Vec::new()), &image);
    assert!(matches!(result, Err(BmpError::InvalidLayout { .. })));
}

/// 2x2 全零图像灰度化后仍然全零
#[test]
fn test_grayscale_all_zero_2x2() {
    let mut image = image_with(2, 2, vec![0; 16]);
    assert_eq!(row_padding(2), 2);

    convert_to_grayscale(&mut image).unwrap();

    let reread = read_bmp(&mut Cursor::new(to_bytes(&image))).unwrap();
    assert!(reread.pixels.as_bytes().iter().all(|&b| b == 0));
}

/// 验证灰度化后 B == G == R、绿色通道不变、填充字节不变，且操作幂等
#[test]
fn test_grayscale_channels_and_idempotence() {
    let (width, height) = (5usize, 3usize);
    let original = random_image(width as i32, height as i32);
    let mut image = original.clone();

    convert_to_grayscale(&mut image).unwrap();

    let before = original.pixels.as_bytes();
    let after = image.pixels.as_bytes();
    for row in 0..height {
        for col in 0..width {
            let p = pixel_offset(width, row, col);
            assert_eq!(after[p + 1], before[p + 1]);
            assert_eq!(after[p], after[p + 1]);
            assert_eq!(after[p + 2], after[p + 1]);
        }
        let padding_start = row * row_stride(width) + width * 3;
        let padding_end = (row + 1) * row_stride(width);
        assert_eq!(
            &after[padding_start..padding_end],
            &before[padding_start..padding_end]
        );
    }

    let once = image.clone();
    convert_to_grayscale(&mut image).unwrap();
    assert_eq!(image, once);
}

/// 自上而下存储 (高度为负) 的图像同样按行处理
#[test]
fn test_grayscale_top_down() {
    let mut image = image_with(1, -2, vec![1, 2, 3, 0, 4, 5, 6, 0]);
    convert_to_grayscale(&mut image).unwrap();
    assert_eq!(image.pixels.as_bytes(), &[2, 2, 2, 0, 5, 5, 5, 0]);
}

/// 像素数据不足时不修改任何字节
#[test]
fn test_grayscale_truncated_data() {
    let mut header = header_for(2, 2);
    header.size -= 6;
    let mut image = BmpImage::new(header, PixelBuffer::from_vec(vec![9, 8, 7, 6, 5, 4, 3, 2, 1, 0]));

    let result = convert_to_grayscale(&mut image);
    assert!(matches!(
        result,
        Err(BmpError::PixelDataTruncated {
            required: 14,
            available: 10
        })
    ));
    assert_eq!(image.pixels.as_bytes(), &[9, 8, 7, 6, 5, 4, 3, 2, 1, 0]);
}

/// 非 24 位无压缩图像在灰度、隐藏和恢复时都被拒绝
#[test]
fn test_transforms_reject_unsupported_format() {
    let mut image = image_with(2, 2, vec![0; 16]);
    image.header.bits_per_pixel = 8;

    assert!(matches!(
        convert_to_grayscale(&mut image),
        Err(BmpError::UnsupportedFormat { .. })
    ));
    assert!(matches!(
        encode_message(&mut image, b"x"),
        Err(BmpError::UnsupportedFormat { .. })
    ));
    assert!(matches!(
        decode_message(&image),
        Err(BmpError::UnsupportedFormat { .. })
    ));

    image.header.bits_per_pixel = 24;
    image.header.compression = 1;
    assert!(matches!(
        encode_message(&mut image, b"x"),
        Err(BmpError::UnsupportedFormat { .. })
    ));
}

/// "hi" 恰好填满 24 个载体字节
#[test]
fn test_encode_hi_fills_carrier_exactly() {
    let mut image = image_with(2, 3, vec![0xFF; 24]);
    assert_eq!(image.data_size(), 8 + 16);

    encode_message(&mut image, b"hi").unwrap();

    let lsbs: Vec<u8> = image.pixels.as_bytes().iter().map(|b| b & 1).collect();
    // 长度 2，然后 'h' = 0x68，'i' = 0x69，均为低位在前
    assert_eq!(
        lsbs,
        vec![
            0, 1, 0, 0, 0, 0, 0, 0, //
            0, 0, 0, 1, 0, 1, 1, 0, //
            1, 0, 0, 1, 0, 1, 1, 0,
        ]
    );
    assert!(image.pixels.as_bytes().iter().all(|b| (b | 1) == 0xFF));
    assert_eq!(decode_message(&image).unwrap(), b"hi");
}

/// 验证不同长度的消息都能完整恢复，且只改变最低位
#[test]
fn test_steganography_round_trip() {
    for len in [0usize, 1, 37, 255] {
        let original = random_image(100, 10);
        let mut image = original.clone();
        let message: Vec<u8> = (0..len).map(|i| (i * 7 + 32) as u8).collect();

        encode_message(&mut image, &message).unwrap();
        assert_eq!(decode_message(&image).unwrap(), message);

        for (a, b) in image
            .pixels
            .as_bytes()
            .iter()
            .zip(original.pixels.as_bytes())
        {
            assert!((a ^ b) <= 1);
        }
    }
}

/// 容量不足时失败，且原缓冲区保持不变
#[test]
fn test_encode_capacity_exceeded() {
    let original = random_image(2, 3);
    let mut image = original.clone();

    let result = encode_message(&mut image, b"hey");
    assert!(matches!(
        result,
        Err(BmpError::CapacityExceeded {
            required: 32,
            available: 24
        })
    ));
    assert_eq!(image, original);
    assert_eq!(capacity(image.data_size()), 2);
}

/// 超过 8 位长度字段的消息被拒绝
#[test]
fn test_encode_rejects_long_message() {
    let mut image = random_image(100, 10);
    let result = encode_message(&mut image, &[b'a'; 256]);
    assert!(matches!(
        result,
        Err(BmpError::MessageTooLong { len: 256, max: 255 })
    ));
    assert_eq!(capacity(image.data_size()), 255);
}

/// 长度字段超出像素数据范围时视为损坏的图像
#[test]
fn test_decode_corrupt_length() {
    let mut bytes = vec![0u8; 16];
    // 长度字段为 200
    for (i, byte) in bytes.iter_mut().take(8).enumerate() {
        *byte = (200u8 >> i) & 1;
    }
    let image = image_with(2, 2, bytes);
    assert!(matches!(
        decode_message(&image),
        Err(BmpError::CapacityExceeded { .. })
    ));

    let tiny = BmpImage::new(
        BmpHeader {
            size: 58,
            ..header_for(0, 0)
        },
        PixelBuffer::from_vec(vec![0; 4]),
    );
    assert!(matches!(
        decode_message(&tiny),
        Err(BmpError::CapacityExceeded { .. })
    ));
}

/// 只有文件头的图像转储为 4 行，最后一行补齐 10 个空位
#[test]
fn test_hex_dump_header_only() {
    let image = image_with(0, 0, Vec::new());
    let dump = hex_dump(&image);
    let lines: Vec<&str> = dump.lines().collect();

    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[0],
        "00000000: 424d 3600 0000 0000 0000 3600 0000 2800   |BM6.......6...(.|"
    );
    assert_eq!(
        lines[3],
        format!("00000030: 0000 0000 0000 {}  |......|", " ".repeat(25))
    );
    assert_eq!(lines[1].len(), lines[0].len());
    assert_eq!(lines[3].len(), lines[0].len() - 10);
    assert!(dump.ends_with("|\n"));
}

/// 总长度为 16 的整数倍时不产生补齐行
#[test]
fn test_hex_dump_full_rows() {
    let mut header = header_for(0, 0);
    header.size += 10;
    let image = BmpImage::new(header, PixelBuffer::from_vec(b"Hello BMP!".to_vec()));

    let dump = hex_dump(&image);
    let lines: Vec<&str> = dump.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[3].starts_with("00000030: "));
    assert!(lines[3].ends_with("  |......Hello BMP!|"));
    assert_eq!(lines[3].len(), lines[0].len());
}

/// 验证消息来源只取第一行并去掉换行符
#[test]
fn test_read_message_line() {
    assert_eq!(
        read_message_line(Cursor::new(b"hello\nworld\n".to_vec())).unwrap(),
        b"hello"
    );
    assert_eq!(
        read_message_line(Cursor::new(b"no newline".to_vec())).unwrap(),
        b"no newline"
    );
    assert_eq!(read_message_line(Cursor::new(b"\n".to_vec())).unwrap(), b"");

    assert!(matches!(
        read_message_line(Cursor::new(Vec::new())),
        Err(BmpError::Io { .. })
    ));

    let mut exact = vec![b'a'; 1000];
    exact.push(b'\n');
    assert_eq!(read_message_line(Cursor::new(exact)).unwrap().len(), 1000);

    assert!(matches!(
        read_message_line(Cursor::new(vec![b'a'; 1001])),
        Err(BmpError::MessageTooLong { max: 1000, .. })
    ));
}

/// 验证错误类别到退出码的映射
#[test]
fn test_exit_codes() {
    let io = BmpError::Io {
        context: "missing".into(),
        source: std::io::Error::from(std::io::ErrorKind::NotFound),
    };
    assert_eq!(io.exit_code(), 1);
    assert_eq!(BmpError::NotBmp { magic: 0 }.exit_code(), 2);
    assert_eq!(
        BmpError::UnsupportedFormat {
            bits_per_pixel: 8,
            compression: 0
        }
        .exit_code(),
        2
    );
    assert_eq!(
        BmpError::CapacityExceeded {
            required: 9,
            available: 8
        }
        .exit_code(),
        2
    );
    assert_eq!(BmpError::AllocationFailure { size: 1 }.exit_code(), 3);
}
