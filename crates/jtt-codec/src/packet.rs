//! 压缩数据包 (Packet).
//!
//! 对标 FFmpeg 的 `AVPacket`. 对 JT/T 1078 来说, 一个 Packet 就是一个完整的
//! 访问单元 (一帧视频或一帧音频), 解封装时由若干分片重组而成,
//! 封装时再被切成若干分片.

use bitflags::bitflags;
use bytes::Bytes;
use jtt_core::Rational;
use jtt_core::timestamp::NOPTS_VALUE;

bitflags! {
    /// 数据包标志, 对标 `AV_PKT_FLAG_*`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PacketFlags: u32 {
        /// 关键帧
        const KEY        = 1 << 0;
        /// 可丢弃帧 (不被其他帧参考, 如 B 帧)
        const DISPOSABLE = 1 << 4;
    }
}

/// 图片类型 (I/P/B 帧)
///
/// 作为数据包的附加信息, 封装时据此决定视频数据类型.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PictureType {
    /// 未指定
    #[default]
    None,
    /// I 帧 (关键帧, 帧内编码)
    I,
    /// P 帧 (前向预测)
    P,
    /// B 帧 (双向预测)
    B,
}

/// 压缩数据包
#[derive(Debug, Clone)]
pub struct Packet {
    /// 压缩数据
    pub data: Bytes,
    /// 显示时间戳 (PTS)
    pub pts: i64,
    /// 解码时间戳 (DTS)
    pub dts: i64,
    /// 数据包时长 (以 time_base 为单位)
    pub duration: i64,
    /// 时间基
    pub time_base: Rational,
    /// 所属流的索引
    pub stream_index: usize,
    /// 标志位
    pub flags: PacketFlags,
    /// 图片类型 (仅视频)
    pub picture_type: PictureType,
    /// 在容器中的字节偏移量 (-1 表示未知)
    pub pos: i64,
}

impl Packet {
    /// 创建空数据包
    pub fn empty() -> Self {
        Self {
            data: Bytes::new(),
            pts: NOPTS_VALUE,
            dts: NOPTS_VALUE,
            duration: 0,
            time_base: Rational::UNDEFINED,
            stream_index: 0,
            flags: PacketFlags::empty(),
            picture_type: PictureType::None,
            pos: -1,
        }
    }

    /// 从数据创建数据包
    pub fn from_data(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            ..Self::empty()
        }
    }

    /// 数据大小 (字节)
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 是否为空包
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 是否为关键帧
    pub fn is_keyframe(&self) -> bool {
        self.flags.contains(PacketFlags::KEY)
    }

    /// 是否为可丢弃帧
    pub fn is_disposable(&self) -> bool {
        self.flags.contains(PacketFlags::DISPOSABLE)
    }

    /// 解码时间戳, 未设置时回退到显示时间戳
    pub fn dts_or_pts(&self) -> i64 {
        if self.dts == NOPTS_VALUE {
            self.pts
        } else {
            self.dts
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_data() {
        let pkt = Packet::from_data(vec![1u8, 2, 3]);
        assert_eq!(pkt.size(), 3);
        assert_eq!(pkt.pts, NOPTS_VALUE);
        assert!(!pkt.is_keyframe());
        assert_eq!(pkt.picture_type, PictureType::None);
    }

    #[test]
    fn test_flags() {
        let mut pkt = Packet::empty();
        pkt.flags |= PacketFlags::KEY;
        assert!(pkt.is_keyframe());
        assert!(!pkt.is_disposable());
    }

    #[test]
    fn test_dts_falls_back_to_pts() {
        let mut pkt = Packet::empty();
        pkt.pts = 40;
        assert_eq!(pkt.dts_or_pts(), 40);
        pkt.dts = 20;
        assert_eq!(pkt.dts_or_pts(), 20);
    }
}
