//! JT/T 1078 → JT/T 1078 重封装.
//!
//! 逐个读出访问单元, 用新的 SIM 卡号和通道号重新切片写出. 流是在读包过程中
//! 逐步发现的, 所以直接按数据包所属的流调用分片切割器, 不经过需要预先给出
//! 全部流的 `Muxer::write_header`.

use std::collections::HashSet;

use anyhow::{Context, Result};
use jtt_codec::Packet;
use jtt_core::{JttError, MediaType};
use jtt_format::demuxers::jtt1078::Jtt1078Demuxer;
use jtt_format::jtt1078::Jtt1078Config;
use jtt_format::jtt1078::codec_table::codec_id_to_payload_type;
use jtt_format::muxers::jtt1078::Jtt1078Fragmenter;
use jtt_format::{Demuxer, IoContext, Stream};
use tracing::{debug, info, warn};

/// 重封装选项
#[derive(Debug, Clone, Default)]
pub struct RemuxOptions {
    /// 输出的封装选项
    pub output: Jtt1078Config,
    /// 输入的协议版本
    pub input_version: u32,
    /// 丢弃音频
    pub drop_audio: bool,
    /// 丢弃视频
    pub drop_video: bool,
}

/// 重封装统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemuxSummary {
    /// 读到的访问单元数
    pub units_in: u64,
    /// 写出的访问单元数
    pub units_out: u64,
    /// 写出的分片数
    pub fragments_out: u64,
    /// 输入中发现的流数
    pub streams: usize,
}

/// 执行重封装, 输入读到末尾为止
pub fn remux(
    input: &mut IoContext,
    output: &mut IoContext,
    opts: &RemuxOptions,
) -> Result<RemuxSummary> {
    let mut fragmenter = Jtt1078Fragmenter::from_config(&opts.output).context("输出选项无效")?;
    let mut demuxer = Jtt1078Demuxer::with_version(opts.input_version);
    demuxer.open(input).context("无法打开输入")?;

    let mut summary = RemuxSummary::default();
    let mut skipped: HashSet<usize> = HashSet::new();

    loop {
        let packet = match demuxer.read_packet(input) {
            Ok(p) => p,
            Err(JttError::Eof) => break,
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("读取第 {} 个访问单元失败", summary.units_in + 1)
                });
            }
        };
        summary.units_in += 1;

        let stream = demuxer
            .streams()
            .get(packet.stream_index)
            .ok_or(JttError::StreamNotFound(packet.stream_index))?;
        if !keep_stream(stream, opts, &mut skipped) {
            continue;
        }

        summary.fragments_out += write_unit(&mut fragmenter, output, stream, &packet)?;
        summary.units_out += 1;
    }

    output.flush()?;
    summary.streams = demuxer.streams().len();
    info!(
        "重封装完成: 读入 {} 个访问单元, 写出 {} 个 ({} 个分片), 下一个包序号 {}",
        summary.units_in,
        summary.units_out,
        summary.fragments_out,
        fragmenter.state().serial_number
    );
    Ok(summary)
}

/// 判断流是否写出, 第一次跳过某条流时记录原因
fn keep_stream(stream: &Stream, opts: &RemuxOptions, skipped: &mut HashSet<usize>) -> bool {
    let reason = match stream.media_type {
        MediaType::Audio if opts.drop_audio => Some("已丢弃音频"),
        MediaType::Video if opts.drop_video => Some("已丢弃视频"),
        _ => {
            let (profile, channels) = stream
                .audio()
                .map(|a| (a.profile, a.channels))
                .unwrap_or_default();
            codec_id_to_payload_type(stream.codec_id, profile, channels)
                .is_none()
                .then_some("编解码器无法封装")
        }
    };
    match reason {
        Some(reason) => {
            if skipped.insert(stream.index) {
                warn!(
                    "跳过流 #{} ({} {}): {reason}",
                    stream.index,
                    stream.media_type.name(),
                    stream.codec_id
                );
            }
            false
        }
        None => true,
    }
}

/// 写出一个访问单元, 返回分片数
fn write_unit(
    fragmenter: &mut Jtt1078Fragmenter,
    output: &mut IoContext,
    stream: &Stream,
    packet: &Packet,
) -> Result<u64> {
    let n = fragmenter
        .write_access_unit(output, stream, packet)
        .with_context(|| format!("写出流 #{} pts={} 失败", stream.index, packet.pts))?;
    debug!(
        "流 #{} pts={} size={} → {n} 个分片",
        stream.index,
        packet.pts,
        packet.size()
    );
    Ok(n as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jtt_codec::{CodecId, PictureType};
    use jtt_core::Rational;
    use jtt_format::io::MemoryBackend;
    use jtt_format::jtt1078::PacketHeader;
    use jtt_format::stream::{AudioStreamParams, StreamParams};

    fn build_input() -> Vec<u8> {
        let video = Stream {
            index: 0,
            media_type: MediaType::Video,
            codec_id: CodecId::H265,
            time_base: Rational::MILLI,
            params: StreamParams::Other,
        };
        let audio = Stream {
            index: 1,
            media_type: MediaType::Audio,
            codec_id: CodecId::PcmMulaw,
            time_base: Rational::MILLI,
            params: StreamParams::Audio(AudioStreamParams::default()),
        };
        let backend = MemoryBackend::new();
        let sink = backend.sink();
        let mut io = IoContext::new(Box::new(backend));
        let mut f = Jtt1078Fragmenter::new("000000000001".parse().unwrap(), 1);
        for i in 0..4i64 {
            let mut v = Packet::from_data(vec![i as u8; 1000]);
            v.pts = i * 40;
            v.picture_type = if i % 2 == 0 { PictureType::I } else { PictureType::B };
            f.write_access_unit(&mut io, &video, &v).unwrap();
            let mut a = Packet::from_data(vec![0x7F; 160]);
            a.pts = i * 40;
            f.write_access_unit(&mut io, &audio, &a).unwrap();
        }
        sink.data()
    }

    fn run(opts: &RemuxOptions) -> (RemuxSummary, Vec<u8>) {
        let mut input = IoContext::from_memory(build_input());
        let backend = MemoryBackend::new();
        let sink = backend.sink();
        let mut output = IoContext::new(Box::new(backend));
        let summary = remux(&mut input, &mut output, opts).unwrap();
        (summary, sink.data())
    }

    fn options() -> RemuxOptions {
        RemuxOptions {
            output: Jtt1078Config {
                sim_no: "013912345678".into(),
                channel_no: 5,
                ..Default::default()
            },
            input_version: 2016,
            ..Default::default()
        }
    }

    #[test]
    fn test_remux_rewrites_identity() {
        let (summary, data) = run(&options());
        assert_eq!(summary.units_in, 8);
        assert_eq!(summary.units_out, 8);
        assert_eq!(summary.fragments_out, 12);
        assert_eq!(summary.streams, 2);

        let mut io = IoContext::from_memory(data);
        let first = PacketHeader::read(&mut io).unwrap();
        assert_eq!(first.sim_no.to_string(), "013912345678");
        assert_eq!(first.channel_no, 5);
        assert_eq!(first.serial_number, 0);
    }

    #[test]
    fn test_remux_drop_audio() {
        let opts = RemuxOptions {
            drop_audio: true,
            ..options()
        };
        let (summary, _) = run(&opts);
        assert_eq!(summary.units_in, 8);
        assert_eq!(summary.units_out, 4);
        assert_eq!(summary.fragments_out, 8);
    }

    #[test]
    fn test_remux_bad_output_config() {
        let opts = RemuxOptions {
            output: Jtt1078Config {
                sim_no: "xyz".into(),
                ..Default::default()
            },
            input_version: 2016,
            ..Default::default()
        };
        let mut input = IoContext::from_memory(build_input());
        let mut output = IoContext::new(Box::new(MemoryBackend::new()));
        assert!(remux(&mut input, &mut output, &opts).is_err());
    }

    #[test]
    fn test_remux_file_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let in_path = dir.path().join("in.1078");
        let out_path = dir.path().join("out.1078");
        std::fs::write(&in_path, build_input()).unwrap();

        let opts = RemuxOptions {
            drop_video: true,
            ..options()
        };
        let summary = {
            let mut input = IoContext::open_read(in_path.to_str().unwrap()).unwrap();
            let mut output = IoContext::open_write(out_path.to_str().unwrap()).unwrap();
            remux(&mut input, &mut output, &opts).unwrap()
        };
        assert_eq!(summary.units_out, 4);
        assert_eq!(summary.fragments_out, 4);

        let mut io = IoContext::open_read(out_path.to_str().unwrap()).unwrap();
        let mut serials = Vec::new();
        while let Ok(h) = PacketHeader::read(&mut io) {
            assert_eq!(h.channel_no, 5);
            assert_eq!(h.payload_type, jtt_format::jtt1078::PayloadType::G711U);
            serials.push(h.serial_number);
            io.skip(usize::from(h.data_length)).unwrap();
        }
        assert_eq!(serials, [0, 1, 2, 3]);
    }
}
