//! 音频编码档次 (profile).
//!
//! 对标 FFmpeg `AVCodecParameters::profile` 中 AAC 相关取值.
//! JT/T 1078 用不同的负载类型区分 AAC 的档次, 封装时需要据此选择负载类型.

/// 音频编码档次
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AudioProfile {
    /// 未知或不适用
    #[default]
    Unknown,
    /// AAC Main
    AacMain,
    /// AAC LC (Low Complexity)
    AacLow,
    /// AAC SSR
    AacSsr,
    /// AAC LTP
    AacLtp,
    /// HE-AAC (AAC + SBR)
    AacHe,
    /// HE-AAC v2 (AAC + SBR + PS)
    AacHeV2,
}

impl AudioProfile {
    /// 是否为 HE-AAC 系列 (v1 或 v2)
    pub const fn is_he_aac(&self) -> bool {
        matches!(self, Self::AacHe | Self::AacHeV2)
    }
}
