//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 每个子命令对应一种操作，携带该操作所需的全部参数。

use clap::Parser;
use std::path::PathBuf;

/// 查看、转储、灰度化 24 位无压缩 BMP 图像，或利用 LSB 隐写在其中隐藏和恢复一行文本。
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 显示 BMP 文件头信息。
    Info(InfoArgs),

    /// 以十六进制格式输出 BMP 文件数据。
    Dump(DumpArgs),

    /// 将 BMP 图像转换为灰度图。
    Grayscale(GrayscaleArgs),

    /// 将消息文件的第一行隐藏到 BMP 图像中。
    Encode(EncodeArgs),

    /// 从 BMP 图像中解码隐藏的消息。
    Decode(DecodeArgs),
}

/// 'info' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// 输入 BMP 文件路径。
    #[arg(short, long)]
    pub image: PathBuf,
}

/// 'dump' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct DumpArgs {
    /// 输入 BMP 文件路径。
    #[arg(short, long)]
    pub image: PathBuf,
}

/// 'grayscale' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct GrayscaleArgs {
    /// 输入 BMP 文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 输出路径，默认为输入文件旁的 `gray_<文件名>`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 覆盖已存在的输出文件。
    #[arg(short, long)]
    pub force: bool,
}

/// 'encode' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct EncodeArgs {
    /// 用作载体的 BMP 文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 消息文件路径，只使用第一行 (最多 255 字节)。
    #[arg(short, long)]
    pub text: PathBuf,

    /// 输出路径，默认为输入文件旁的 `doctored_<文件名>`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 覆盖已存在的输出文件。
    #[arg(short, long)]
    pub force: bool,
}

/// 'decode' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct DecodeArgs {
    /// 隐藏了消息的 BMP 文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 另外把原始消息字节保存到此文件。
    #[arg(short, long)]
    pub text: Option<PathBuf>,

    /// 覆盖已存在的输出文件。
    #[arg(short, long)]
    pub force: bool,
}
