//! jtt-probe - JT/T 1078 码流信息探测工具
//!
//! 对标 FFmpeg 的 ffprobe. JT/T 1078 码流没有文件头, 流信息要读完数据包才能确定,
//! 因此本工具总是读取整个输入.

use std::collections::BTreeMap;
use std::process;

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Serialize;

use jtt_codec::Packet;
use jtt_core::JttError;
use jtt_format::demuxers::jtt1078::Jtt1078Demuxer;
use jtt_format::jtt1078::{PacketHeader, SUPPORTED_VERSION};
use jtt_format::stream::StreamParams;
use jtt_format::{Demuxer, FormatId, FormatRegistry, IoContext, Stream};

/// JT/T 1078 码流信息探测工具
#[derive(Parser, Debug)]
#[command(name = "jtt-probe", version, about = "纯 Rust JT/T 1078 码流探测工具")]
struct Cli {
    /// 输入文件路径
    input: Option<String>,

    /// 协议版本 (发布年份)
    #[arg(long, default_value_t = SUPPORTED_VERSION)]
    version_year: u32,

    /// 逐个显示访问单元
    #[arg(long)]
    show_packets: bool,

    /// 输出 JSON 格式
    #[arg(long)]
    json: bool,

    /// 静默模式 (只输出探测结果)
    #[arg(short, long)]
    quiet: bool,
}

// ============================================================
// JSON 输出结构体
// ============================================================

/// 完整探测结果
#[derive(Serialize)]
struct ProbeOutput {
    format: FormatInfo,
    streams: Vec<StreamInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    packets: Option<Vec<PacketInfo>>,
}

/// 格式信息
#[derive(Serialize)]
struct FormatInfo {
    filename: String,
    format_name: String,
    probe_score: u32,
    nb_streams: usize,
    nb_packets: u64,
    total_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    sim_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    channel_no: Option<u8>,
    /// 读取中断时的错误
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// 流信息
#[derive(Serialize)]
struct StreamInfo {
    index: usize,
    codec_type: String,
    codec_name: String,
    time_base: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sample_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    channels: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bits_per_coded_sample: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bit_rate: Option<u64>,
    nb_frames: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_time_ms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_time_ms: Option<i64>,
}

/// 单个访问单元
#[derive(Serialize)]
struct PacketInfo {
    stream_index: usize,
    pts_ms: i64,
    size: usize,
    pos: i64,
    flags: String,
    picture_type: String,
    serial_number: u16,
    last_i_frame_interval: Option<u16>,
    last_frame_interval: Option<u16>,
}

/// 每条流的统计
#[derive(Default)]
struct StreamStats {
    nb_frames: u64,
    first_pts: Option<i64>,
    last_pts: Option<i64>,
}

// ============================================================
// 主逻辑
// ============================================================

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let Some(input_path) = cli.input.as_deref() else {
        print_banner();
        return;
    };

    if !cli.quiet {
        eprintln!(
            "jtt-probe 版本 {} -- 纯 Rust JT/T 1078 码流探测工具",
            env!("CARGO_PKG_VERSION")
        );
        eprintln!("输入文件: {input_path}");
    }

    let output = match probe_file(input_path, cli.version_year, cli.show_packets) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("错误: {e:#}");
            process::exit(1);
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("错误: JSON 序列化失败: {e}");
                process::exit(1);
            }
        }
    } else {
        print_format_text(&output.format);
        print_streams_text(&output.streams);
        if let Some(ref packets) = output.packets {
            print_packets_text(packets);
        }
    }
}

/// 探测并读完整个输入
fn probe_file(path: &str, version: u32, show_packets: bool) -> Result<ProbeOutput> {
    let mut registry = FormatRegistry::new();
    jtt_format::register_all(&mut registry);

    let mut io = IoContext::open_read(path).with_context(|| format!("无法打开文件 '{path}'"))?;
    let probe = registry
        .probe_input(&mut io, Some(path))
        .context("无法识别文件格式")?;
    if probe.format_id != FormatId::Jtt1078 {
        bail!("不是 JT/T 1078 码流: {}", probe.format_id);
    }
    log::debug!("探测结果: {} (置信度 {})", probe.format_id, probe.score);

    let mut demuxer = Jtt1078Demuxer::with_version(version);
    demuxer.open(&mut io).context("无法打开解封装器")?;

    let mut stats: BTreeMap<usize, StreamStats> = BTreeMap::new();
    let mut packets = show_packets.then(Vec::new);
    let mut nb_packets = 0u64;
    let mut total_bytes = 0u64;
    let mut identity: Option<(String, u8)> = None;
    let mut error = None;

    loop {
        match demuxer.read_packet(&mut io) {
            Ok(pkt) => {
                nb_packets += 1;
                total_bytes += pkt.size() as u64;
                let entry = stats.entry(pkt.stream_index).or_default();
                entry.nb_frames += 1;
                if pkt.pts != jtt_core::timestamp::NOPTS_VALUE {
                    entry.first_pts.get_or_insert(pkt.pts);
                    entry.last_pts = Some(pkt.pts);
                }
                if let Some(header) = demuxer.last_header() {
                    identity.get_or_insert_with(|| (header.sim_no.to_string(), header.channel_no));
                    if let Some(list) = packets.as_mut() {
                        list.push(build_packet_info(&pkt, header));
                    }
                }
            }
            Err(JttError::Eof) => break,
            Err(e) => {
                log::warn!("读取数据包时出错: {e}");
                error = Some(e.to_string());
                break;
            }
        }
    }

    let streams = demuxer
        .streams()
        .iter()
        .map(|s| build_stream_info(s, stats.get(&s.index)))
        .collect::<Vec<_>>();
    let (sim_no, channel_no) = identity.unzip();

    Ok(ProbeOutput {
        format: FormatInfo {
            filename: path.to_string(),
            format_name: probe.format_id.name().to_string(),
            probe_score: probe.score,
            nb_streams: streams.len(),
            nb_packets,
            total_bytes,
            sim_no,
            channel_no,
            error,
        },
        streams,
        packets,
    })
}

/// 从 Stream 构建 StreamInfo
fn build_stream_info(stream: &Stream, stats: Option<&StreamStats>) -> StreamInfo {
    let mut info = StreamInfo {
        index: stream.index,
        codec_type: stream.media_type.name().to_string(),
        codec_name: stream.codec_id.to_string(),
        time_base: stream.time_base.to_string(),
        sample_rate: None,
        channels: None,
        bits_per_coded_sample: None,
        bit_rate: None,
        nb_frames: stats.map_or(0, |s| s.nb_frames),
        start_time_ms: stats.and_then(|s| s.first_pts),
        end_time_ms: stats.and_then(|s| s.last_pts),
    };

    if let StreamParams::Audio(a) = &stream.params {
        info.sample_rate = (a.sample_rate > 0).then_some(a.sample_rate);
        info.channels = (a.channels > 0).then_some(a.channels);
        info.bits_per_coded_sample =
            (a.bits_per_coded_sample > 0).then_some(a.bits_per_coded_sample);
        info.bit_rate = (a.bit_rate > 0).then_some(a.bit_rate);
    }

    info
}

/// 由数据包和收尾分片头构建 PacketInfo
fn build_packet_info(pkt: &Packet, header: &PacketHeader) -> PacketInfo {
    let flags = format!(
        "{}{}",
        if pkt.is_keyframe() { 'K' } else { '_' },
        if pkt.is_disposable() { 'D' } else { '_' }
    );
    PacketInfo {
        stream_index: pkt.stream_index,
        pts_ms: pkt.pts,
        size: pkt.size(),
        pos: pkt.pos,
        flags,
        picture_type: format!("{:?}", pkt.picture_type),
        serial_number: header.serial_number,
        last_i_frame_interval: header.last_i_frame_interval,
        last_frame_interval: header.last_frame_interval,
    }
}

/// 文本输出: 格式信息
fn print_format_text(info: &FormatInfo) {
    println!("[FORMAT]");
    println!("  文件名       : {}", info.filename);
    println!("  格式名称     : {}", info.format_name);
    println!("  探测置信度   : {}", info.probe_score);
    println!("  流数量       : {}", info.nb_streams);
    println!("  访问单元数   : {}", info.nb_packets);
    println!("  数据总量     : {} 字节", info.total_bytes);
    if let Some(ref sim) = info.sim_no {
        println!("  SIM 卡号     : {sim}");
    }
    if let Some(ch) = info.channel_no {
        println!("  逻辑通道号   : {ch}");
    }
    if let Some(ref e) = info.error {
        println!("  读取中断     : {e}");
    }
    println!("[/FORMAT]");
    println!();
}

/// 文本输出: 流信息
fn print_streams_text(streams: &[StreamInfo]) {
    for stream in streams {
        println!("[STREAM #{}]", stream.index);
        println!("  类型         : {}", stream.codec_type);
        println!("  编解码器     : {}", stream.codec_name);
        println!("  时间基       : {}", stream.time_base);
        if let Some(sr) = stream.sample_rate {
            println!("  采样率       : {sr} Hz");
        }
        if let Some(ch) = stream.channels {
            println!("  声道数       : {ch}");
        }
        if let Some(bits) = stream.bits_per_coded_sample {
            println!("  编码位数     : {bits}");
        }
        if let Some(br) = stream.bit_rate {
            println!("  码率         : {} kbps", br / 1000);
        }
        println!("  帧数         : {}", stream.nb_frames);
        if let (Some(start), Some(end)) = (stream.start_time_ms, stream.end_time_ms) {
            println!("  时间范围     : {start} ~ {end} ms");
        }
        println!("[/STREAM]");
        println!();
    }
}

/// 文本输出: 访问单元列表
fn print_packets_text(packets: &[PacketInfo]) {
    println!("[PACKETS]");
    for p in packets {
        println!(
            "  #{:<2} pts={:<14} size={:<6} pos={:<8} {} {:<4} serial={}",
            p.stream_index, p.pts_ms, p.size, p.pos, p.flags, p.picture_type, p.serial_number
        );
    }
    println!("[/PACKETS]");
    println!();
}

/// 打印版本横幅
fn print_banner() {
    println!(
        "jtt-probe 版本 {} -- 纯 Rust JT/T 1078 码流探测工具",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("用法: jtt-probe [选项] <输入文件>");
    println!();
    println!("选项:");
    println!("  --version-year <年份>  协议版本 (默认 2016)");
    println!("  --show-packets         逐个显示访问单元");
    println!("  --json                 以 JSON 格式输出");
    println!("  -q, --quiet            静默模式");
    println!();
    println!("使用 --help 查看完整用法.");
}
