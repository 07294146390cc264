//! 分片头的读取与写出.

use byteorder::{BigEndian, WriteBytesExt};
use jtt_core::{JttError, JttResult};

use super::config::DeviceId;
use super::types::{DataType, PacketType, PayloadType};
use super::{MAGIC, MAX_PAYLOAD_SIZE, PREAMBLE_SIZE, VERSION_BYTE};
use crate::io::IoContext;

/// 分片头
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketHeader {
    /// 帧边界标识, 为 true 表示这是访问单元的最后一个分片
    pub frame_boundary: bool,
    /// 负载类型
    pub payload_type: PayloadType,
    /// 包序号
    pub serial_number: u16,
    /// SIM 卡号
    pub sim_no: DeviceId,
    /// 逻辑通道号
    pub channel_no: u8,
    /// 数据类型
    pub data_type: DataType,
    /// 分包处理标记
    pub packet_type: PacketType,
    /// 时间戳 (毫秒), 透传数据为 `None`
    pub timestamp_ms: Option<u64>,
    /// 距上一关键帧的间隔 (毫秒), 仅视频
    pub last_i_frame_interval: Option<u16>,
    /// 距上一帧的间隔 (毫秒), 仅视频
    pub last_frame_interval: Option<u16>,
    /// 数据体长度
    pub data_length: u16,
}

impl PacketHeader {
    /// 读取定长前导 (偏移 0..16)
    ///
    /// 时间字段与数据体长度保持为空, 需要随后调用 [`read_fields`](Self::read_fields).
    /// 在分片的第一个字节处遇到输入末尾返回 `JttError::Eof`; 读到一半被截断返回 I/O 错误.
    pub fn read_preamble(io: &mut IoContext) -> JttResult<Self> {
        let mut buf = [0u8; PREAMBLE_SIZE];
        buf[0] = io.read_u8()?;
        io.read_exact(&mut buf[1..])
            .map_err(|e| e.truncated("JT/T 1078 分片头"))?;
        Self::parse_preamble(&buf)
    }

    /// 从 16 字节前导解析
    pub fn parse_preamble(buf: &[u8; PREAMBLE_SIZE]) -> JttResult<Self> {
        if buf[..4] != MAGIC {
            return Err(JttError::InvalidData(format!(
                "JT/T 1078: 帧头标识错误 {:02X?}",
                &buf[..4]
            )));
        }
        let frame_boundary = buf[5] & 0x80 != 0;
        let payload_type = PayloadType::from_u8(buf[5] & 0x7F);
        let serial_number = u16::from_be_bytes([buf[6], buf[7]]);
        let mut sim = [0u8; 6];
        sim.copy_from_slice(&buf[8..14]);
        let channel_no = buf[14];
        let data_type = DataType::from_u8(buf[15] >> 4).ok_or_else(|| {
            JttError::InvalidData(format!("JT/T 1078: 未定义的数据类型 {}", buf[15] >> 4))
        })?;
        let packet_type = PacketType::from_u8(buf[15] & 0x0F);

        Ok(Self {
            frame_boundary,
            payload_type,
            serial_number,
            sim_no: DeviceId(sim),
            channel_no,
            data_type,
            packet_type,
            timestamp_ms: None,
            last_i_frame_interval: None,
            last_frame_interval: None,
            data_length: 0,
        })
    }

    /// 读取前导之后的时间字段与数据体长度
    ///
    /// - 视频: 时间戳 + 两个间隔字段
    /// - 音频: 时间戳
    /// - 透传数据: 协议没有给出可解析的布局, 返回 `InvalidData`
    ///
    /// 数据体长度超过 950 返回 `InvalidData`.
    pub fn read_fields(&mut self, io: &mut IoContext) -> JttResult<()> {
        let truncated = |e: JttError| e.truncated("JT/T 1078 分片头");
        match self.data_type {
            DataType::VideoI | DataType::VideoP | DataType::VideoB => {
                self.timestamp_ms = Some(io.read_u64_be().map_err(truncated)?);
                self.last_i_frame_interval = Some(io.read_u16_be().map_err(truncated)?);
                self.last_frame_interval = Some(io.read_u16_be().map_err(truncated)?);
            }
            DataType::Audio => {
                self.timestamp_ms = Some(io.read_u64_be().map_err(truncated)?);
            }
            DataType::Raw => {
                return Err(JttError::InvalidData(
                    "JT/T 1078: 不支持解析透传数据分片".into(),
                ));
            }
        }

        let data_length = io.read_u16_be().map_err(truncated)?;
        if usize::from(data_length) > MAX_PAYLOAD_SIZE {
            return Err(JttError::InvalidData(format!(
                "JT/T 1078: 数据体长度 {data_length} 超过上限 {MAX_PAYLOAD_SIZE}"
            )));
        }
        self.data_length = data_length;
        Ok(())
    }

    /// 读取一个完整的分片头
    pub fn read(io: &mut IoContext) -> JttResult<Self> {
        let mut header = Self::read_preamble(io)?;
        header.read_fields(io)?;
        Ok(header)
    }

    /// 把分片头 (含数据体长度字段) 追加写入 `out`
    ///
    /// 透传数据不写时间字段; 音频只写时间戳; 视频写时间戳和两个间隔字段,
    /// 缺省的字段按 0 写出.
    pub fn write(&self, out: &mut Vec<u8>) -> JttResult<()> {
        out.extend_from_slice(&MAGIC);
        out.write_u8(VERSION_BYTE)?;
        let m = if self.frame_boundary { 0x80 } else { 0x00 };
        out.write_u8(m | self.payload_type.as_u8())?;
        out.write_u16::<BigEndian>(self.serial_number)?;
        out.extend_from_slice(self.sim_no.as_bytes());
        out.write_u8(self.channel_no)?;
        out.write_u8((self.data_type.as_u8() << 4) | self.packet_type.as_u8())?;

        if self.data_type.has_timestamp() {
            out.write_u64::<BigEndian>(self.timestamp_ms.unwrap_or(0))?;
            if self.data_type.is_video() {
                out.write_u16::<BigEndian>(self.last_i_frame_interval.unwrap_or(0))?;
                out.write_u16::<BigEndian>(self.last_frame_interval.unwrap_or(0))?;
            }
        }

        out.write_u16::<BigEndian>(self.data_length)?;
        Ok(())
    }

    /// 分片头 (含数据体长度字段) 的字节数
    pub fn encoded_len(&self) -> usize {
        let timing = match self.data_type {
            DataType::VideoI | DataType::VideoP | DataType::VideoB => 12,
            DataType::Audio => 8,
            DataType::Raw => 0,
        };
        PREAMBLE_SIZE + timing + 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 关键帧分片头: H.264, 带边界标识, 时间戳 0x0189_1B1E_9EF4, 3 字节负载
    fn video_i_header_bytes() -> Vec<u8> {
        vec![
            0x30, 0x31, 0x63, 0x64, 0x81, 0xE2, 0x00, 0x00, 0x01, 0x38, 0x00, 0x13, 0x80, 0x00,
            0x01, 0x00, 0x00, 0x00, 0x01, 0x89, 0x1B, 0x1E, 0x9E, 0xF4, 0x00, 0x28, 0x00, 0x28,
            0x00, 0x03,
        ]
    }

    #[test]
    fn test_read_video_header() {
        let mut io = IoContext::from_memory(video_i_header_bytes());
        let h = PacketHeader::read(&mut io).unwrap();
        assert!(h.frame_boundary);
        assert_eq!(h.payload_type, PayloadType::H264);
        assert_eq!(h.serial_number, 0);
        assert_eq!(h.sim_no.to_string(), "013800138000");
        assert_eq!(h.channel_no, 1);
        assert_eq!(h.data_type, DataType::VideoI);
        assert_eq!(h.packet_type, PacketType::Atomic);
        assert_eq!(h.timestamp_ms, Some(0x0189_1B1E_9EF4));
        assert_eq!(h.last_i_frame_interval, Some(40));
        assert_eq!(h.last_frame_interval, Some(40));
        assert_eq!(h.data_length, 3);
        assert_eq!(h.encoded_len(), 30);
    }

    #[test]
    fn test_write_matches_read() {
        let bytes = video_i_header_bytes();
        let mut io = IoContext::from_memory(bytes.clone());
        let h = PacketHeader::read(&mut io).unwrap();
        let mut out = Vec::new();
        h.write(&mut out).unwrap();
        assert_eq!(out, bytes);
    }

    #[test]
    fn test_audio_header_has_no_intervals() {
        let h = PacketHeader {
            frame_boundary: true,
            payload_type: PayloadType::G711A,
            serial_number: 7,
            sim_no: DeviceId::default(),
            channel_no: 2,
            data_type: DataType::Audio,
            packet_type: PacketType::Atomic,
            timestamp_ms: Some(1000),
            last_i_frame_interval: None,
            last_frame_interval: None,
            data_length: 160,
        };
        let mut out = Vec::new();
        h.write(&mut out).unwrap();
        assert_eq!(out.len(), 26);
        assert_eq!(out.len(), h.encoded_len());
        assert_eq!(out[5], 0x86);
        assert_eq!(out[15], 0x30);
        assert_eq!(&out[24..26], &[0x00, 0xA0]);
    }

    #[test]
    fn test_data_length_over_limit() {
        let mut bytes = video_i_header_bytes();
        let n = bytes.len();
        bytes[n - 2..].copy_from_slice(&951u16.to_be_bytes());
        let mut io = IoContext::from_memory(bytes);
        assert!(matches!(
            PacketHeader::read(&mut io),
            Err(JttError::InvalidData(_))
        ));
    }

    #[test]
    fn test_raw_data_type_rejected() {
        let mut bytes = video_i_header_bytes();
        bytes[15] = 0x40;
        let mut io = IoContext::from_memory(bytes);
        assert!(matches!(
            PacketHeader::read(&mut io),
            Err(JttError::InvalidData(_))
        ));
    }

    #[test]
    fn test_undefined_data_type_rejected() {
        let mut bytes = video_i_header_bytes();
        bytes[15] = 0x70;
        let mut io = IoContext::from_memory(bytes);
        assert!(matches!(
            PacketHeader::read(&mut io),
            Err(JttError::InvalidData(_))
        ));
    }

    #[test]
    fn test_bad_magic_rejected() {
        let mut bytes = video_i_header_bytes();
        bytes[0] = 0x00;
        let mut io = IoContext::from_memory(bytes);
        assert!(matches!(
            PacketHeader::read(&mut io),
            Err(JttError::InvalidData(_))
        ));
    }

    #[test]
    fn test_eof_vs_truncation() {
        let mut io = IoContext::from_memory(Vec::new());
        assert!(matches!(PacketHeader::read(&mut io), Err(JttError::Eof)));

        let bytes = video_i_header_bytes();
        let mut io = IoContext::from_memory(bytes[..10].to_vec());
        assert!(matches!(PacketHeader::read(&mut io), Err(JttError::Io(_))));

        let mut io = IoContext::from_memory(bytes[..20].to_vec());
        assert!(matches!(PacketHeader::read(&mut io), Err(JttError::Io(_))));
    }
}
