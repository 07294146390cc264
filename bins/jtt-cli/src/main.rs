//! jtt-cli - JT/T 1078 码流重封装命令行工具
//!
//! 读取一段 JT/T 1078 码流 (文件或标准输入), 以新的 SIM 卡号和逻辑通道号
//! 重新切片写出, 可选丢弃音频或视频.

mod logging;
mod remux;

use std::path::Path;
use std::process;

use anyhow::{Context, Result, bail};
use clap::Parser;

use jtt_format::IoContext;
use jtt_format::io::StreamBackend;
use jtt_format::jtt1078::{Jtt1078Config, SUPPORTED_VERSION};

use remux::{RemuxOptions, remux};

#[derive(Parser, Debug)]
#[command(name = "jtt-cli", version, about = "纯 Rust JT/T 1078 码流重封装工具")]
struct Cli {
    /// 输入文件路径 ("-" 表示标准输入)
    #[arg(short, long)]
    input: String,

    /// 输出文件路径
    #[arg(short, long)]
    output: String,

    /// 输出的 SIM 卡号 (12 位十六进制数字)
    #[arg(long, default_value = "000000000000")]
    sim_no: String,

    /// 输出的逻辑通道号 (1~37)
    #[arg(long, default_value_t = 1)]
    channel_no: u8,

    /// 协议版本 (发布年份), 同时用于输入和输出
    #[arg(long = "protocol-version", default_value_t = SUPPORTED_VERSION)]
    protocol_version: u32,

    /// 丢弃音频
    #[arg(long = "an")]
    drop_audio: bool,

    /// 丢弃视频
    #[arg(long = "vn")]
    drop_video: bool,

    /// 覆盖输出文件
    #[arg(short = 'y', long)]
    overwrite: bool,

    /// 日志级别 (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = logging::init("jtt-cli", cli.verbose) {
        eprintln!("警告: 日志初始化失败: {e:#}");
    }

    if let Err(e) = run(&cli) {
        tracing::error!("{e:#}");
        eprintln!("错误: {e:#}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    if !cli.overwrite && Path::new(&cli.output).exists() {
        bail!("输出文件已存在 '{}', 使用 -y 覆盖", cli.output);
    }

    let opts = RemuxOptions {
        output: Jtt1078Config {
            version: cli.protocol_version,
            sim_no: cli.sim_no.clone(),
            channel_no: cli.channel_no,
        },
        input_version: cli.protocol_version,
        drop_audio: cli.drop_audio,
        drop_video: cli.drop_video,
    };
    // 先校验选项, 避免留下空的输出文件
    opts.output.validate().context("输出选项无效")?;

    eprintln!(
        "jtt-cli 版本 {} -- 纯 Rust JT/T 1078 重封装工具",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("输入: {}", cli.input);
    eprintln!("输出: {}", cli.output);

    let mut input = if cli.input == "-" {
        IoContext::new(Box::new(StreamBackend::new(std::io::stdin())))
    } else {
        IoContext::open_read(&cli.input)
            .with_context(|| format!("无法打开输入 '{}'", cli.input))?
    };
    let mut output = IoContext::open_write(&cli.output)
        .with_context(|| format!("无法创建输出 '{}'", cli.output))?;

    let summary = remux(&mut input, &mut output, &opts)?;
    eprintln!(
        "完成: 读入 {} 个访问单元 ({} 条流), 写出 {} 个访问单元, {} 个分片",
        summary.units_in, summary.streams, summary.units_out, summary.fragments_out
    );
    Ok(())
}
