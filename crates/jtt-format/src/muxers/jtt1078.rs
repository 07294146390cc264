//! JT/T 1078 实时码流封装器.
//!
//! 把每个访问单元切成负载不超过 950 字节的分片依次写出. 视频分片携带距上一
//! 关键帧、距上一帧的毫秒间隔, 间隔在访问单元写完后才更新.

use jtt_codec::{Packet, PictureType};
use jtt_core::timestamp::to_millis;
use jtt_core::{JttError, JttResult, MediaType};
use log::{debug, trace};

use crate::format_id::FormatId;
use crate::io::IoContext;
use crate::jtt1078::codec_table::codec_id_to_payload_type;
use crate::jtt1078::{
    DataType, DeviceId, Jtt1078Config, MAX_PAYLOAD_SIZE, PacketHeader, PacketType, PayloadType,
};
use crate::muxer::Muxer;
use crate::stream::Stream;

/// 跨访问单元保留的封装状态
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentationState {
    /// 下一个分片的包序号
    pub serial_number: u16,
    /// 上一个关键帧的解码时间 (毫秒)
    pub last_i_frame_ms: Option<i64>,
    /// 上一个视频帧的解码时间 (毫秒)
    pub last_frame_ms: Option<i64>,
}

impl FragmentationState {
    /// 取出当前包序号并递增, 65535 之后回到 0
    fn next_serial(&mut self) -> u16 {
        let serial = self.serial_number;
        self.serial_number = self.serial_number.wrapping_add(1);
        serial
    }
}

/// 毫秒差值, 收敛到 0..=65535
fn interval_since(now: i64, last: Option<i64>) -> u16 {
    match last {
        Some(last) => u16::try_from(now.saturating_sub(last).max(0)).unwrap_or(u16::MAX),
        None => 0,
    }
}

/// 分片切割器
///
/// 一个切割器只服务一条输出, 包序号和时间间隔在整条输出上连续.
#[derive(Debug, Clone)]
pub struct Jtt1078Fragmenter {
    sim_no: DeviceId,
    channel_no: u8,
    state: FragmentationState,
}

impl Jtt1078Fragmenter {
    /// 使用已解析的设备标识和通道号创建
    pub fn new(sim_no: DeviceId, channel_no: u8) -> Self {
        Self {
            sim_no,
            channel_no,
            state: FragmentationState::default(),
        }
    }

    /// 校验配置后创建
    pub fn from_config(config: &Jtt1078Config) -> JttResult<Self> {
        let sim_no = config.validate()?;
        Ok(Self::new(sim_no, config.channel_no))
    }

    /// 当前封装状态
    pub fn state(&self) -> &FragmentationState {
        &self.state
    }

    /// 把一个访问单元切片写出, 返回写出的分片数
    ///
    /// 编解码器没有对应的负载类型时返回 `Unsupported`. 写出失败时已写出的分片
    /// 不会撤回, 包序号也不回退.
    pub fn write_access_unit(
        &mut self,
        io: &mut IoContext,
        stream: &Stream,
        packet: &Packet,
    ) -> JttResult<usize> {
        let payload_type = resolve_payload_type(stream)?;
        let data_type = resolve_data_type(stream.media_type, packet.picture_type);

        let time_base = if packet.time_base.is_valid() {
            packet.time_base
        } else {
            stream.time_base
        };
        let (timestamp_ms, dts_ms) = if data_type.has_timestamp() {
            let pts_ms = to_millis(packet.pts, time_base)
                .or_else(|| to_millis(packet.dts, time_base))
                .ok_or_else(|| {
                    JttError::InvalidArgument(format!(
                        "JT/T 1078: 流 #{} 的数据包缺少时间戳",
                        stream.index
                    ))
                })?;
            let timestamp_ms = u64::try_from(pts_ms).map_err(|_| {
                JttError::InvalidArgument(format!("JT/T 1078: 负时间戳 {pts_ms} ms"))
            })?;
            let dts_ms = to_millis(packet.dts_or_pts(), time_base).unwrap_or(pts_ms);
            (Some(timestamp_ms), dts_ms)
        } else {
            (None, 0)
        };

        let (last_i_frame_interval, last_frame_interval) = if data_type.is_video() {
            (
                Some(interval_since(dts_ms, self.state.last_i_frame_ms)),
                Some(interval_since(dts_ms, self.state.last_frame_ms)),
            )
        } else {
            (None, None)
        };

        let data = &packet.data[..];
        let size = data.len();
        let mut fragments = 0;
        let mut buf = Vec::with_capacity(MAX_PAYLOAD_SIZE + 32);
        for (i, chunk) in data.chunks(MAX_PAYLOAD_SIZE).enumerate() {
            let offset = i * MAX_PAYLOAD_SIZE;
            let end = offset + chunk.len();
            let packet_type = PacketType::for_fragment(offset, end, size);
            let header = PacketHeader {
                frame_boundary: end == size,
                payload_type,
                serial_number: self.state.next_serial(),
                sim_no: self.sim_no,
                channel_no: self.channel_no,
                data_type,
                packet_type,
                timestamp_ms,
                last_i_frame_interval,
                last_frame_interval,
                // chunks() 保证不超过 950
                data_length: chunk.len() as u16,
            };

            buf.clear();
            header.write(&mut buf)?;
            buf.extend_from_slice(chunk);
            io.write_all(&buf)?;
            fragments += 1;

            trace!(
                "JT/T 1078: 写出分片 serial={} {:?} {:?} len={}",
                header.serial_number,
                data_type,
                packet_type,
                chunk.len()
            );

            if packet_type.completes_unit() && data_type.is_video() {
                self.state.last_frame_ms = Some(dts_ms);
                if data_type == DataType::VideoI {
                    self.state.last_i_frame_ms = Some(dts_ms);
                }
            }
        }
        Ok(fragments)
    }
}

/// 由流的编解码器参数选择负载类型
fn resolve_payload_type(stream: &Stream) -> JttResult<PayloadType> {
    let (profile, channels) = stream
        .audio()
        .map(|a| (a.profile, a.channels))
        .unwrap_or_default();
    codec_id_to_payload_type(stream.codec_id, profile, channels).ok_or_else(|| {
        JttError::Unsupported(format!(
            "JT/T 1078: 不支持封装编解码器 {} (流 #{})",
            stream.codec_id, stream.index
        ))
    })
}

/// 由媒体类型和图片类型选择数据类型
///
/// 视频包没有图片类型时按透传数据写出, 不带时间字段.
fn resolve_data_type(media_type: MediaType, picture_type: PictureType) -> DataType {
    match media_type {
        MediaType::Audio => DataType::Audio,
        MediaType::Data => DataType::Raw,
        MediaType::Video => match picture_type {
            PictureType::I => DataType::VideoI,
            PictureType::P => DataType::VideoP,
            PictureType::B => DataType::VideoB,
            PictureType::None => DataType::Raw,
        },
    }
}

/// JT/T 1078 封装器
pub struct Jtt1078Muxer {
    /// 封装选项
    config: Jtt1078Config,
    /// 输出流
    streams: Vec<Stream>,
    /// 分片状态, write_header 之后可用
    fragmenter: Option<Jtt1078Fragmenter>,
}

impl Jtt1078Muxer {
    /// 创建 JT/T 1078 封装器实例 (工厂函数, 默认选项)
    pub fn create() -> JttResult<Box<dyn Muxer>> {
        Ok(Box::new(Self::with_config(Jtt1078Config::default())))
    }

    /// 指定封装选项创建, 选项在 `write_header` 时校验
    pub fn with_config(config: Jtt1078Config) -> Self {
        Self {
            config,
            streams: Vec::new(),
            fragmenter: None,
        }
    }

    /// 当前封装状态
    pub fn state(&self) -> Option<&FragmentationState> {
        self.fragmenter.as_ref().map(Jtt1078Fragmenter::state)
    }
}

impl Muxer for Jtt1078Muxer {
    fn format_id(&self) -> FormatId {
        FormatId::Jtt1078
    }

    fn name(&self) -> &str {
        "jtt1078"
    }

    fn write_header(&mut self, _io: &mut IoContext, streams: &[Stream]) -> JttResult<()> {
        if streams.is_empty() {
            return Err(JttError::InvalidArgument("JT/T 1078: 没有输入流".into()));
        }
        for stream in streams {
            resolve_payload_type(stream)?;
        }
        let fragmenter = Jtt1078Fragmenter::from_config(&self.config)?;
        debug!(
            "JT/T 1078: 开始封装, SIM={} 通道={} 流数={}",
            self.config.sim_no,
            self.config.channel_no,
            streams.len()
        );
        self.streams = streams.to_vec();
        self.fragmenter = Some(fragmenter);
        Ok(())
    }

    fn write_packet(&mut self, io: &mut IoContext, packet: &Packet) -> JttResult<()> {
        let fragmenter = self
            .fragmenter
            .as_mut()
            .ok_or_else(|| JttError::InvalidArgument("JT/T 1078: 尚未写入头部".into()))?;
        let stream = self
            .streams
            .get(packet.stream_index)
            .ok_or(JttError::StreamNotFound(packet.stream_index))?;
        fragmenter.write_access_unit(io, stream, packet)?;
        Ok(())
    }

    fn write_trailer(&mut self, io: &mut IoContext) -> JttResult<()> {
        if let Some(state) = self.state() {
            debug!("JT/T 1078: 封装结束, 下一个包序号 {}", state.serial_number);
        }
        io.flush()
    }
}
