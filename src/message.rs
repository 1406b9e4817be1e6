//! # 消息来源模块
//!
//! 从文本来源读取待隐藏的消息：只取第一行，去掉结尾的换行符。

use crate::constants::MAX_MESSAGE_LINE;
use crate::error::{BmpError, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader, ErrorKind, Read};
use std::path::Path;

/// 读取第一行 (不含 `\n`)。
///
/// # Errors
///
/// * 来源为空或读取失败：[`BmpError::Io`]
/// * 该行超过 1000 字节：[`BmpError::MessageTooLong`]
pub fn read_message_line<R: BufRead>(reader: R) -> Result<Vec<u8>> {
    let mut line = Vec::new();
    // 多读一个字节：换行符，或者说明该行超长
    let limit = (MAX_MESSAGE_LINE + 1) as u64;
    let read = reader
        .take(limit)
        .read_until(b'\n', &mut line)
        .map_err(|e| BmpError::io("Error reading message from file", e))?;

    if read == 0 {
        return Err(BmpError::io(
            "Error reading message from file",
            io::Error::new(ErrorKind::UnexpectedEof, "message source is empty"),
        ));
    }

    if line.last() == Some(&b'\n') {
        line.pop();
    }

    if line.len() > MAX_MESSAGE_LINE {
        return Err(BmpError::MessageTooLong {
            len: line.len(),
            max: MAX_MESSAGE_LINE,
        });
    }

    Ok(line)
}

/// 读取 `path` 文件的第一行作为消息。
pub fn read_message_file(path: &Path) -> Result<Vec<u8>> {
    let file = File::open(path).map_err(|e| {
        let context = if e.kind() == ErrorKind::NotFound {
            format!("File not found: '{}'", path.display())
        } else {
            format!("Unable to open file '{}'", path.display())
        };
        BmpError::io(context, e)
    })?;
    read_message_line(BufReader::new(file))
}
