use clap::Parser;
use colored::Colorize;
use std::io;
use std::process::ExitCode;

use bmpkit::{
    cli::{Cli, Commands},
    error::BmpError,
    handler::{handle_decode, handle_dump, handle_encode, handle_grayscale, handle_info},
};

/// 程序的主入口点
///
/// 负责解析命令行参数，并根据指定的子命令将执行分派到相应的处理函数，
/// 最后把错误类别映射为进程退出码
fn main() -> ExitCode {
    env_logger::init();

    // 解析命令行参数，参数错误时 clap 以退出码 2 结束进程
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Info(args) => handle_info(args),
        Commands::Dump(args) => handle_dump(args),
        Commands::Grayscale(args) => handle_grayscale(args),
        Commands::Encode(args) => handle_encode(args),
        Commands::Decode(args) => handle_decode(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "Error:".red().bold(), err);
            ExitCode::from(exit_code(&err))
        }
    }
}

/// 在错误链中查找核心错误类型以确定退出码；
/// 没有核心错误时，纯 I/O 错误返回 1，其余 (如拒绝覆盖文件) 返回 2。
fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(bmp_err) = err.chain().find_map(|e| e.downcast_ref::<BmpError>()) {
        return bmp_err.exit_code();
    }
    if err.chain().any(|e| e.is::<io::Error>()) {
        return 1;
    }
    2
}
