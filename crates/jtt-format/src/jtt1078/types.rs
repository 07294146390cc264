//! 协议枚举: 数据类型、分包处理标记、负载类型.

use std::fmt;

/// 数据类型 (第 15 字节高 4 位)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// 视频 I 帧
    VideoI,
    /// 视频 P 帧
    VideoP,
    /// 视频 B 帧
    VideoB,
    /// 音频帧
    Audio,
    /// 透传数据
    Raw,
}

impl DataType {
    /// 从 4 位取值解析, 未定义的取值返回 `None`
    pub const fn from_u8(v: u8) -> Option<Self> {
        match v {
            0b0000 => Some(Self::VideoI),
            0b0001 => Some(Self::VideoP),
            0b0010 => Some(Self::VideoB),
            0b0011 => Some(Self::Audio),
            0b0100 => Some(Self::Raw),
            _ => None,
        }
    }

    /// 线上取值
    pub const fn as_u8(&self) -> u8 {
        match self {
            Self::VideoI => 0b0000,
            Self::VideoP => 0b0001,
            Self::VideoB => 0b0010,
            Self::Audio => 0b0011,
            Self::Raw => 0b0100,
        }
    }

    /// 是否为视频帧
    pub const fn is_video(&self) -> bool {
        matches!(self, Self::VideoI | Self::VideoP | Self::VideoB)
    }

    /// 是否携带时间戳字段
    pub const fn has_timestamp(&self) -> bool {
        !matches!(self, Self::Raw)
    }
}

/// 分包处理标记 (第 15 字节低 4 位, 只用到低 2 位)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketType {
    /// 原子包, 访问单元未被拆分
    Atomic,
    /// 第一个分片
    First,
    /// 最后一个分片
    Last,
    /// 中间分片
    Intermediate,
}

impl PacketType {
    /// 从取值解析 (只看低 2 位)
    pub const fn from_u8(v: u8) -> Self {
        match v & 0b11 {
            0b00 => Self::Atomic,
            0b01 => Self::First,
            0b10 => Self::Last,
            _ => Self::Intermediate,
        }
    }

    /// 线上取值
    pub const fn as_u8(&self) -> u8 {
        match self {
            Self::Atomic => 0b00,
            Self::First => 0b01,
            Self::Last => 0b10,
            Self::Intermediate => 0b11,
        }
    }

    /// 根据分片位置计算分包标记
    ///
    /// - `offset`: 本分片在访问单元中的起始偏移
    /// - `end`: 本分片结束后的偏移
    /// - `size`: 访问单元总长度
    pub const fn for_fragment(offset: usize, end: usize, size: usize) -> Self {
        if size <= super::MAX_PAYLOAD_SIZE {
            Self::Atomic
        } else if offset == 0 {
            Self::First
        } else if end >= size {
            Self::Last
        } else {
            Self::Intermediate
        }
    }

    /// 是否为访问单元的收尾分片 (原子包或最后一个分片)
    pub const fn completes_unit(&self) -> bool {
        matches!(self, Self::Atomic | Self::Last)
    }
}

/// 负载类型 (第 5 字节低 7 位)
///
/// 协议表中没有列出的取值保存在 `Unknown` 中, 原样往返.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadType {
    /// G.721
    G721,
    /// G.722
    G722,
    /// G.723
    G723,
    /// G.728
    G728,
    /// G.729
    G729,
    /// G.711 A-law
    G711A,
    /// G.711 μ-law
    G711U,
    /// G.726
    G726,
    /// G.729 Annex A
    G729A,
    /// DVI4 3 bit
    Dvi4_3,
    /// DVI4 4 bit
    Dvi4_4,
    /// DVI4 8 kHz
    Dvi4_8k,
    /// DVI4 16 kHz
    Dvi4_16k,
    /// LPC
    Lpc,
    /// 16 位大端 PCM 立体声
    S16beStereo,
    /// 16 位大端 PCM 单声道
    S16beMono,
    /// MPEG 音频
    MpegAudio,
    /// LPCM
    Lpcm,
    /// AAC
    Aac,
    /// WMA 9 标准版
    Wma9Std,
    /// HE-AAC
    HeAac,
    /// PCM 语音
    PcmVoice,
    /// PCM 音频
    PcmAudio,
    /// AAC-LC
    AacLc,
    /// MP3
    Mp3,
    /// ADPCM-A
    AdpcmA,
    /// MPEG-4 音频
    Mp4Audio,
    /// AMR 窄带
    Amr,
    /// 透传
    Raw,
    /// H.264
    H264,
    /// H.265
    H265,
    /// AVS
    Avs,
    /// SVAC
    Svac,
    /// 协议未定义的取值
    Unknown(u8),
}

impl PayloadType {
    /// 从 7 位取值解析
    pub const fn from_u8(v: u8) -> Self {
        match v & 0x7F {
            1 => Self::G721,
            2 => Self::G722,
            3 => Self::G723,
            4 => Self::G728,
            5 => Self::G729,
            6 => Self::G711A,
            7 => Self::G711U,
            8 => Self::G726,
            9 => Self::G729A,
            10 => Self::Dvi4_3,
            11 => Self::Dvi4_4,
            12 => Self::Dvi4_8k,
            13 => Self::Dvi4_16k,
            14 => Self::Lpc,
            15 => Self::S16beStereo,
            16 => Self::S16beMono,
            17 => Self::MpegAudio,
            18 => Self::Lpcm,
            19 => Self::Aac,
            20 => Self::Wma9Std,
            21 => Self::HeAac,
            22 => Self::PcmVoice,
            23 => Self::PcmAudio,
            24 => Self::AacLc,
            25 => Self::Mp3,
            26 => Self::AdpcmA,
            27 => Self::Mp4Audio,
            28 => Self::Amr,
            91 => Self::Raw,
            98 => Self::H264,
            99 => Self::H265,
            100 => Self::Avs,
            101 => Self::Svac,
            other => Self::Unknown(other),
        }
    }

    /// 线上取值 (7 位)
    pub const fn as_u8(&self) -> u8 {
        match self {
            Self::G721 => 1,
            Self::G722 => 2,
            Self::G723 => 3,
            Self::G728 => 4,
            Self::G729 => 5,
            Self::G711A => 6,
            Self::G711U => 7,
            Self::G726 => 8,
            Self::G729A => 9,
            Self::Dvi4_3 => 10,
            Self::Dvi4_4 => 11,
            Self::Dvi4_8k => 12,
            Self::Dvi4_16k => 13,
            Self::Lpc => 14,
            Self::S16beStereo => 15,
            Self::S16beMono => 16,
            Self::MpegAudio => 17,
            Self::Lpcm => 18,
            Self::Aac => 19,
            Self::Wma9Std => 20,
            Self::HeAac => 21,
            Self::PcmVoice => 22,
            Self::PcmAudio => 23,
            Self::AacLc => 24,
            Self::Mp3 => 25,
            Self::AdpcmA => 26,
            Self::Mp4Audio => 27,
            Self::Amr => 28,
            Self::Raw => 91,
            Self::H264 => 98,
            Self::H265 => 99,
            Self::Avs => 100,
            Self::Svac => 101,
            Self::Unknown(v) => *v & 0x7F,
        }
    }
}

impl fmt::Display for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(v) => write!(f, "unknown({v})"),
            other => write!(f, "{other:?}({})", other.as_u8()),
        }
    }
}
