//! 编解码器标识符.
//!
//! 对标 FFmpeg 的 `AVCodecID`, 只收录 JT/T 1078 负载类型能表达的编解码器.

use std::fmt;
use jtt_core::MediaType;

/// 编解码器标识符
///
/// 唯一标识一种编解码算法, 与容器格式无关.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CodecId {
    /// 未知编解码器
    None,

    // ========================
    // 视频编解码器
    // ========================
    /// H.264 / AVC
    H264,
    /// H.265 / HEVC
    H265,
    /// AVS (中国音视频编码标准, FFmpeg 中称 CAVS)
    Cavs,

    // ========================
    // 音频编解码器
    // ========================
    /// AAC (Advanced Audio Coding)
    Aac,
    /// MP3 (MPEG Audio Layer III)
    Mp3,
    /// G.711 A-law
    PcmAlaw,
    /// G.711 μ-law
    PcmMulaw,
    /// PCM 有符号 16 位大端
    PcmS16be,
    /// G.722 ADPCM
    AdpcmG722,
    /// G.726 ADPCM (小端码字排列)
    AdpcmG726le,
    /// Yamaha ADPCM
    AdpcmYamaha,
    /// G.723.1
    G723_1,
    /// G.729
    G729,
    /// AMR 窄带
    AmrNb,
}

impl CodecId {
    /// 获取编解码器对应的媒体类型
    pub const fn media_type(&self) -> MediaType {
        match self {
            Self::None => MediaType::Data,

            Self::H264 | Self::H265 | Self::Cavs => MediaType::Video,

            Self::Aac
            | Self::Mp3
            | Self::PcmAlaw
            | Self::PcmMulaw
            | Self::PcmS16be
            | Self::AdpcmG722
            | Self::AdpcmG726le
            | Self::AdpcmYamaha
            | Self::G723_1
            | Self::G729
            | Self::AmrNb => MediaType::Audio,
        }
    }

    /// 获取编解码器的人类可读名称 (与 FFmpeg 命名一致)
    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::H264 => "h264",
            Self::H265 => "hevc",
            Self::Cavs => "cavs",
            Self::Aac => "aac",
            Self::Mp3 => "mp3",
            Self::PcmAlaw => "pcm_alaw",
            Self::PcmMulaw => "pcm_mulaw",
            Self::PcmS16be => "pcm_s16be",
            Self::AdpcmG722 => "adpcm_g722",
            Self::AdpcmG726le => "adpcm_g726le",
            Self::AdpcmYamaha => "adpcm_yamaha",
            Self::G723_1 => "g723_1",
            Self::G729 => "g729",
            Self::AmrNb => "amr_nb",
        }
    }
}

impl fmt::Display for CodecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type() {
        assert_eq!(CodecId::H265.media_type(), MediaType::Video);
        assert_eq!(CodecId::PcmAlaw.media_type(), MediaType::Audio);
        assert_eq!(CodecId::None.media_type(), MediaType::Data);
    }

    #[test]
    fn test_display() {
        assert_eq!(CodecId::H265.to_string(), "hevc");
        assert_eq!(CodecId::AdpcmG726le.to_string(), "adpcm_g726le");
    }
}
