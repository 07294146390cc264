//! JT/T 1078 实时码流解封装器.
//!
//! 码流没有文件头, 由连续的分片组成. 解封装器逐个读取分片头, 按
//! `(数据类型, 负载类型)` 把分片负载拼接到各自的缓冲区, 遇到带帧边界标识的
//! 分片时交出一个完整的访问单元. 流在第一次见到某个组合时才创建.
//!
//! # 厂商音频子头
//! 部分海思方案的设备会在每个音频分片的负载前加 4 字节子头
//! `00 01 (len-4)/2 00`. 负载开头恰好是这 4 个字节时将其去掉; 正常负载若以
//! 相同字节开头也会被去掉, 这是已知的误判.

use std::collections::HashMap;

use bytes::Bytes;
use jtt_codec::{Packet, PacketFlags, PictureType};
use jtt_core::{JttError, JttResult, Rational};
use log::{debug, trace, warn};

use crate::demuxer::Demuxer;
use crate::format_id::FormatId;
use crate::io::IoContext;
use crate::jtt1078::codec_table::{
    data_type_to_media_type, payload_type_to_codec_id, stream_params_for,
};
use crate::jtt1078::config::check_version;
use crate::jtt1078::{
    DataType, MAGIC, PacketHeader, PayloadType, SUPPORTED_VERSION, VERSION_BYTE,
};
use crate::probe::{FormatProbe, ProbeScore, SCORE_EXTENSION, SCORE_MAX, SCORE_PARTIAL};
use crate::stream::{Stream, StreamRegistry};

/// 厂商音频子头长度
const VENDOR_HEADER_SIZE: u16 = 4;

/// 逻辑流标识
type StreamKey = (DataType, PayloadType);

/// 尚未收齐的访问单元
#[derive(Debug, Default)]
struct PartialUnit {
    /// 已拼接的负载
    data: Vec<u8>,
    /// 第一个分片在输入中的字节偏移 (-1 表示未知)
    pos: i64,
}

/// 分片重组器
///
/// 每个逻辑流一个缓冲区, 跨多次调用保留. 一个重组器只服务一条输入.
#[derive(Debug, Default)]
pub struct Jtt1078Reassembler {
    /// 各逻辑流正在拼接的访问单元
    pending: HashMap<StreamKey, PartialUnit>,
    /// 最近一个收尾分片的头部
    last_header: Option<PacketHeader>,
}

impl Jtt1078Reassembler {
    /// 创建空的重组器
    pub fn new() -> Self {
        Self::default()
    }

    /// 最近一个完整访问单元的收尾分片头部
    pub fn last_header(&self) -> Option<&PacketHeader> {
        self.last_header.as_ref()
    }

    /// 正在拼接、尚未收到帧边界的访问单元个数
    pub fn pending_units(&self) -> usize {
        self.pending.len()
    }

    /// 读取分片直到拼出一个完整的访问单元
    ///
    /// 返回的数据包时间基为 1/1000 秒, pts/dts 为分片中的毫秒时间戳.
    /// 在分片边界遇到输入末尾返回 `JttError::Eof`, 未收齐的缓冲区保留.
    /// 读到某个分片的逻辑流之后出错, 该逻辑流的缓冲区被丢弃.
    pub fn next_access_unit<R: StreamRegistry + ?Sized>(
        &mut self,
        io: &mut IoContext,
        streams: &mut R,
    ) -> JttResult<Packet> {
        loop {
            let pos = io
                .position()
                .ok()
                .and_then(|p| i64::try_from(p).ok())
                .unwrap_or(-1);
            let mut header = PacketHeader::read_preamble(io)?;
            let key = (header.data_type, header.payload_type);

            if let Err(e) = self.read_fragment(io, &mut header, key, pos) {
                if let Some(dropped) = self.pending.remove(&key) {
                    warn!(
                        "JT/T 1078: 分片读取失败, 丢弃 {:?}/{:?} 未完成的 {} 字节",
                        key.0,
                        key.1,
                        dropped.data.len()
                    );
                }
                return Err(e);
            }

            trace!(
                "JT/T 1078: 分片 serial={} {:?} {:?} {:?} len={} M={}",
                header.serial_number,
                header.data_type,
                header.payload_type,
                header.packet_type,
                header.data_length,
                header.frame_boundary,
            );

            if header.frame_boundary {
                let unit = self.pending.remove(&key).unwrap_or_default();
                let packet = Self::finish_unit(&header, unit, streams);
                self.last_header = Some(header);
                return packet;
            }
        }
    }

    /// 读取前导之后的字段和负载, 负载追加到逻辑流缓冲区
    fn read_fragment(
        &mut self,
        io: &mut IoContext,
        header: &mut PacketHeader,
        key: StreamKey,
        pos: i64,
    ) -> JttResult<()> {
        header.read_fields(io)?;

        if header.data_type == DataType::Audio && strip_vendor_header(io, header.data_length)? {
            trace!("JT/T 1078: 去掉音频分片的厂商子头");
            header.data_length -= VENDOR_HEADER_SIZE;
        }

        let unit = self.pending.entry(key).or_insert_with(|| PartialUnit {
            data: Vec::new(),
            pos,
        });
        io.append_bytes(&mut unit.data, usize::from(header.data_length))
            .map_err(|e| e.truncated("JT/T 1078 分片负载"))
    }

    /// 为收齐的访问单元查找或创建流, 生成数据包
    fn finish_unit<R: StreamRegistry + ?Sized>(
        header: &PacketHeader,
        unit: PartialUnit,
        streams: &mut R,
    ) -> JttResult<Packet> {
        // 先做可能失败的转换, 出错时不留下新建的流
        let ts = match header.timestamp_ms {
            Some(ms) => i64::try_from(ms).map_err(|_| {
                JttError::InvalidData(format!("JT/T 1078: 时间戳超出范围 {ms}"))
            })?,
            None => jtt_core::timestamp::NOPTS_VALUE,
        };

        let media_type = data_type_to_media_type(header.data_type);
        let codec_id = payload_type_to_codec_id(header.payload_type);
        let stream_index = match streams.find_stream(media_type, codec_id) {
            Some(index) => index,
            None => {
                let params = stream_params_for(header.payload_type, header.data_length);
                let index = streams.create_stream(media_type, codec_id, Rational::MILLI, params);
                debug!(
                    "JT/T 1078: 新建流 #{index}: {media_type:?} {codec_id} (负载类型 {:?})",
                    header.payload_type
                );
                index
            }
        };

        let (flags, picture_type) = match header.data_type {
            DataType::VideoI => (PacketFlags::KEY, PictureType::I),
            DataType::VideoP => (PacketFlags::empty(), PictureType::P),
            DataType::VideoB => (PacketFlags::DISPOSABLE, PictureType::B),
            DataType::Audio | DataType::Raw => (PacketFlags::empty(), PictureType::None),
        };

        let mut packet = Packet::from_data(Bytes::from(unit.data));
        packet.pts = ts;
        packet.dts = ts;
        packet.time_base = Rational::MILLI;
        packet.stream_index = stream_index;
        packet.flags = flags;
        packet.picture_type = picture_type;
        packet.pos = unit.pos;
        Ok(packet)
    }
}

/// 查看音频负载开头是否为厂商子头, 是则消耗掉并返回 true
fn strip_vendor_header(io: &mut IoContext, data_length: u16) -> JttResult<bool> {
    if data_length < VENDOR_HEADER_SIZE {
        return Ok(false);
    }
    let expected = (data_length - VENDOR_HEADER_SIZE) / 2;
    let head = io
        .peek_bytes(usize::from(VENDOR_HEADER_SIZE))
        .map_err(|e| e.truncated("JT/T 1078 音频负载"))?;
    let matched =
        head[0] == 0x00 && head[1] == 0x01 && u16::from(head[2]) == expected && head[3] == 0x00;
    if matched {
        io.skip(usize::from(VENDOR_HEADER_SIZE))?;
    }
    Ok(matched)
}

/// JT/T 1078 解封装器
pub struct Jtt1078Demuxer {
    /// 协议版本
    version: u32,
    /// 已发现的流
    streams: Vec<Stream>,
    /// 分片重组状态
    reassembler: Jtt1078Reassembler,
}

impl Jtt1078Demuxer {
    /// 创建 JT/T 1078 解封装器实例 (工厂函数)
    pub fn create() -> JttResult<Box<dyn Demuxer>> {
        Ok(Box::new(Self::with_version(SUPPORTED_VERSION)))
    }

    /// 指定协议版本创建, 版本在 `open` 时校验
    pub fn with_version(version: u32) -> Self {
        Self {
            version,
            streams: Vec::new(),
            reassembler: Jtt1078Reassembler::new(),
        }
    }

    /// 最近一个访问单元的收尾分片头部
    pub fn last_header(&self) -> Option<&PacketHeader> {
        self.reassembler.last_header()
    }
}

impl Demuxer for Jtt1078Demuxer {
    fn format_id(&self) -> FormatId {
        FormatId::Jtt1078
    }

    fn name(&self) -> &str {
        "jtt1078"
    }

    fn open(&mut self, _io: &mut IoContext) -> JttResult<()> {
        check_version(self.version)?;
        debug!("JT/T 1078: 打开输入, 协议版本 {}", self.version);
        Ok(())
    }

    fn streams(&self) -> &[Stream] {
        &self.streams
    }

    fn read_packet(&mut self, io: &mut IoContext) -> JttResult<Packet> {
        check_version(self.version)?;
        let result = self.reassembler.next_access_unit(io, &mut self.streams);
        if matches!(result, Err(JttError::Eof)) && self.reassembler.pending_units() > 0 {
            warn!(
                "JT/T 1078: 输入结束, 仍有 {} 个访问单元未收到帧边界",
                self.reassembler.pending_units()
            );
        }
        result
    }
}

/// JT/T 1078 格式探测器
pub struct Jtt1078Probe;

impl FormatProbe for Jtt1078Probe {
    fn probe(&self, data: &[u8], filename: Option<&str>) -> Option<ProbeScore> {
        if data.len() >= 5 && data[..4] == MAGIC {
            if data[4] == VERSION_BYTE {
                return Some(SCORE_MAX);
            }
            if data[4] & 0x80 != 0 {
                return Some(SCORE_PARTIAL);
            }
        }

        if let Some(name) = filename {
            if FormatId::from_filename(name) == Some(FormatId::Jtt1078) {
                return Some(SCORE_EXTENSION);
            }
        }

        None
    }

    fn format_id(&self) -> FormatId {
        FormatId::Jtt1078
    }
}
