//! 端到端集成测试: JT/T 1078 码流的封装/解封装管线.
//!
//! 测试流程: 构造访问单元 → 通过注册表封装 → 自动探测 → 解封装 → 验证

use bytes::Bytes;
use jtt1078::codec::{AudioProfile, CodecId, Packet, PictureType};
use jtt1078::core::{JttError, MediaType, Rational};
use jtt1078::format::{
    FormatId, IoContext,
    demuxers::jtt1078::Jtt1078Demuxer,
    io::{MemoryBackend, StreamBackend},
    jtt1078::{Jtt1078Config, PacketHeader, PacketType},
    muxers::jtt1078::Jtt1078Muxer,
    stream::{AudioStreamParams, Stream, StreamParams},
};
use jtt1078::format::{Demuxer, Muxer};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// 辅助: 创建视频流描述
fn make_video_stream(index: usize, codec_id: CodecId) -> Stream {
    Stream {
        index,
        media_type: MediaType::Video,
        codec_id,
        time_base: Rational::new(1, 90_000),
        params: StreamParams::Other,
    }
}

/// 辅助: 创建音频流描述
fn make_audio_stream(index: usize, codec_id: CodecId, channels: u32) -> Stream {
    Stream {
        index,
        media_type: MediaType::Audio,
        codec_id,
        time_base: Rational::new(1, 8000),
        params: StreamParams::Audio(AudioStreamParams {
            sample_rate: 8000,
            channels,
            profile: AudioProfile::Unknown,
            ..Default::default()
        }),
    }
}

/// 辅助: 生成有规律的负载, 便于发现错位
fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len).map(|i| (i as u8).wrapping_mul(7).wrapping_add(seed)).collect()
}

fn video_packet(stream_index: usize, ms: i64, picture_type: PictureType, data: Vec<u8>) -> Packet {
    let mut pkt = Packet::from_data(data);
    pkt.stream_index = stream_index;
    pkt.pts = ms * 90;
    pkt.dts = ms * 90;
    pkt.time_base = Rational::new(1, 90_000);
    pkt.picture_type = picture_type;
    pkt
}

fn audio_packet(stream_index: usize, ms: i64, data: Vec<u8>) -> Packet {
    let mut pkt = Packet::from_data(data);
    pkt.stream_index = stream_index;
    pkt.pts = ms * 8;
    pkt.time_base = Rational::new(1, 8000);
    pkt
}

/// 通过注册表封装一组数据包, 返回输出字节
fn mux(config: Jtt1078Config, streams: &[Stream], packets: &[Packet]) -> Vec<u8> {
    let backend = MemoryBackend::new();
    let sink = backend.sink();
    let mut io = IoContext::new(Box::new(backend));
    let mut muxer = Jtt1078Muxer::with_config(config);
    muxer.write_header(&mut io, streams).unwrap();
    for pkt in packets {
        muxer.write_packet(&mut io, pkt).unwrap();
    }
    muxer.write_trailer(&mut io).unwrap();
    sink.data()
}

/// 读完全部数据包
fn demux_all(demuxer: &mut dyn Demuxer, io: &mut IoContext) -> Vec<Packet> {
    let mut out = Vec::new();
    loop {
        match demuxer.read_packet(io) {
            Ok(pkt) => out.push(pkt),
            Err(JttError::Eof) => break,
            Err(e) => panic!("解封装失败: {e}"),
        }
    }
    out
}

fn config() -> Jtt1078Config {
    Jtt1078Config {
        sim_no: "013800138000".into(),
        channel_no: 1,
        ..Default::default()
    }
}

#[test]
fn test_mux_demux_roundtrip() {
    init_logger();
    let streams = [
        make_video_stream(0, CodecId::H264),
        make_audio_stream(1, CodecId::PcmAlaw, 1),
    ];
    let packets = vec![
        video_packet(0, 1000, PictureType::I, pattern(500, 1)),
        audio_packet(1, 1000, pattern(320, 2)),
        video_packet(0, 1040, PictureType::P, pattern(300, 3)),
        video_packet(0, 1080, PictureType::B, pattern(200, 4)),
        audio_packet(1, 1040, pattern(320, 5)),
    ];
    let data = mux(config(), &streams, &packets);

    let registry = jtt1078::default_format_registry();
    let mut io = IoContext::from_memory(data);
    let mut demuxer = registry.open_input(&mut io, None).unwrap();
    assert_eq!(demuxer.format_id(), FormatId::Jtt1078);
    let out = demux_all(demuxer.as_mut(), &mut io);

    assert_eq!(out.len(), packets.len());
    let expected_ms = [1000, 1000, 1040, 1080, 1040];
    for ((got, sent), ms) in out.iter().zip(&packets).zip(expected_ms) {
        assert_eq!(got.data, sent.data);
        assert_eq!(got.pts, ms);
        assert_eq!(got.time_base, Rational::MILLI);
        assert_eq!(got.picture_type, sent.picture_type);
    }
    assert!(out[0].is_keyframe());
    assert!(!out[2].is_keyframe());
    assert!(out[3].is_disposable());

    let found = demuxer.streams();
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].codec_id, CodecId::H264);
    assert_eq!(found[1].codec_id, CodecId::PcmAlaw);
    assert_eq!(found[1].media_type, MediaType::Audio);
    assert_eq!(out[1].stream_index, 1);
    assert_eq!(out[2].stream_index, 0);
}

#[test]
fn test_large_unit_fragmentation() {
    init_logger();
    let streams = [make_video_stream(0, CodecId::H265)];
    let payload = pattern(3000, 9);
    let data = mux(
        config(),
        &streams,
        &[video_packet(0, 0, PictureType::I, payload.clone())],
    );

    // 3000 = 950 * 3 + 150
    let mut io = IoContext::from_memory(data.clone());
    let mut types = Vec::new();
    while let Ok(h) = PacketHeader::read(&mut io) {
        types.push((h.packet_type, h.frame_boundary, h.data_length));
        io.skip(usize::from(h.data_length)).unwrap();
    }
    assert_eq!(
        types,
        [
            (PacketType::First, false, 950),
            (PacketType::Intermediate, false, 950),
            (PacketType::Intermediate, false, 950),
            (PacketType::Last, true, 150),
        ]
    );

    let mut io = IoContext::from_memory(data);
    let mut demuxer = Jtt1078Demuxer::create().unwrap();
    demuxer.open(&mut io).unwrap();
    let out = demux_all(demuxer.as_mut(), &mut io);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].data, Bytes::from(payload));
}

#[test]
fn test_remux_is_byte_identical() {
    init_logger();
    let streams = [
        make_video_stream(0, CodecId::H264),
        make_audio_stream(1, CodecId::PcmS16be, 2),
    ];
    let packets = vec![
        video_packet(0, 0, PictureType::I, pattern(2000, 1)),
        audio_packet(1, 0, pattern(640, 2)),
        video_packet(0, 40, PictureType::P, pattern(100, 3)),
        video_packet(0, 80, PictureType::I, pattern(960, 4)),
    ];
    let first = mux(config(), &streams, &packets);

    let mut io = IoContext::from_memory(first.clone());
    let mut demuxer = Jtt1078Demuxer::create().unwrap();
    demuxer.open(&mut io).unwrap();
    let out = demux_all(demuxer.as_mut(), &mut io);
    let found = demuxer.streams().to_vec();
    assert_eq!(found[1].audio().map(|a| a.channels), Some(2));

    let second = mux(config(), &found, &out);
    assert_eq!(first, second);
}

#[test]
fn test_file_roundtrip_with_extension_probe() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("camera.1078");
    let path_str = path.to_str().unwrap();

    let streams = [make_audio_stream(0, CodecId::AdpcmG726le, 1)];
    {
        let mut io = IoContext::open_write(path_str).unwrap();
        let mut muxer = Jtt1078Muxer::with_config(config());
        muxer.write_header(&mut io, &streams).unwrap();
        for i in 0..5 {
            muxer
                .write_packet(&mut io, &audio_packet(0, i * 20, pattern(80, i as u8)))
                .unwrap();
        }
        muxer.write_trailer(&mut io).unwrap();
    }

    let registry = jtt1078::default_format_registry();
    assert_eq!(
        registry.probe(&[], Some(path_str)).map(|r| r.format_id),
        Some(FormatId::Jtt1078)
    );

    let mut io = IoContext::open_read(path_str).unwrap();
    let mut demuxer = registry.open_input(&mut io, Some(path_str)).unwrap();
    let out = demux_all(demuxer.as_mut(), &mut io);
    assert_eq!(out.len(), 5);
    assert_eq!(out[4].pts, 80);

    let g726 = demuxer.streams()[0].audio().cloned().unwrap();
    assert_eq!(g726.sample_rate, 8000);
    assert_eq!(g726.bits_per_coded_sample, 2);
    assert_eq!(g726.bit_rate, 16_000);
}

#[test]
fn test_non_seekable_input_with_vendor_header() {
    init_logger();
    // 海思子头: 00 01 (len-4)/2 00, len = 4 + 160
    let mut vendor_payload = vec![0x00, 0x01, 80, 0x00];
    vendor_payload.extend(pattern(160, 3));

    let streams = [make_audio_stream(0, CodecId::PcmMulaw, 1)];
    let data = mux(
        config(),
        &streams,
        &[
            audio_packet(0, 0, vendor_payload),
            audio_packet(0, 20, pattern(160, 4)),
        ],
    );

    let mut io = IoContext::new(Box::new(StreamBackend::new(std::io::Cursor::new(data))));
    assert!(!io.is_seekable());
    let registry = jtt1078::default_format_registry();
    let mut demuxer = registry.open_input(&mut io, None).unwrap();
    let out = demux_all(demuxer.as_mut(), &mut io);
    assert_eq!(out.len(), 2);
    assert_eq!(&out[0].data[..], &pattern(160, 3)[..]);
    assert_eq!(&out[1].data[..], &pattern(160, 4)[..]);
}

#[test]
fn test_header_scenario_decodes() {
    init_logger();
    let data = vec![
        0x30, 0x31, 0x63, 0x64, 0x81, 0xE2, 0x00, 0x00, 0x01, 0x38, 0x00, 0x13, 0x80, 0x00, 0x01,
        0x00, 0x00, 0x00, 0x01, 0x89, 0x1B, 0x1E, 0x9E, 0xF4, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03,
        0x01, 0x02, 0x03,
    ];
    let mut io = IoContext::from_memory(data);
    let registry = jtt1078::default_format_registry();
    let mut demuxer = registry.open_input(&mut io, None).unwrap();
    let pkt = demuxer.read_packet(&mut io).unwrap();
    assert_eq!(&pkt.data[..], &[1, 2, 3]);
    assert_eq!(pkt.pts, 0x0189_1B1E_9EF4);
    assert!(pkt.is_keyframe());
    assert_eq!(demuxer.streams()[0].codec_id, CodecId::H264);
    assert!(matches!(demuxer.read_packet(&mut io), Err(JttError::Eof)));
}

/// 字节 15 为 0x30 (音频、原子包), 没有间隔字段, 长度之后紧跟 C0 01 02,
/// 末尾剩下一个 0x03 构成被截断的下一个分片
#[test]
fn test_literal_scenario_bytes_decode_as_audio() {
    init_logger();
    let data = vec![
        0x30, 0x31, 0x63, 0x64, 0x81, 0xE2, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01,
        0x30, 0x00, 0x00, 0x01, 0x89, 0x1B, 0x1E, 0x9E, 0xF4, 0x00, 0x03, 0xC0, 0x01, 0x02, 0x03,
    ];
    let mut io = IoContext::from_memory(data);
    let registry = jtt1078::default_format_registry();
    let mut demuxer = registry.open_input(&mut io, None).unwrap();

    let pkt = demuxer.read_packet(&mut io).unwrap();
    assert_eq!(&pkt.data[..], &[0xC0, 0x01, 0x02]);
    assert_eq!(pkt.pts, 1_688_377_138_932);
    assert!(!pkt.is_keyframe());
    assert_eq!(pkt.picture_type, PictureType::None);

    let stream = &demuxer.streams()[pkt.stream_index];
    assert_eq!(stream.media_type, MediaType::Audio);
    assert_eq!(stream.codec_id, CodecId::H264);

    match demuxer.read_packet(&mut io) {
        Err(JttError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
        other => panic!("期望截断错误, 实际: {other:?}"),
    }
}

#[test]
fn test_unsupported_codec_rejected_by_muxer() {
    init_logger();
    let streams = [make_video_stream(0, CodecId::None)];
    let mut io = IoContext::new(Box::new(MemoryBackend::new()));
    let mut muxer = Jtt1078Muxer::with_config(config());
    assert!(matches!(
        muxer.write_header(&mut io, &streams),
        Err(JttError::Unsupported(_))
    ));
}

#[test]
fn test_registry_lists_format() {
    let registry = jtt1078::default_format_registry();
    let demuxers = registry.list_demuxers();
    let muxers = registry.list_muxers();
    assert_eq!(demuxers, vec![(FormatId::Jtt1078, "jtt1078")]);
    assert_eq!(muxers, vec![(FormatId::Jtt1078, "jtt1078")]);
    assert!(!jtt1078::version().is_empty());
}
