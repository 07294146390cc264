//! 流信息定义.
//!
//! 对标 FFmpeg 的 `AVStream`, 描述容器中的一条逻辑流.

use jtt_codec::{AudioProfile, CodecId};
use jtt_core::{MediaType, Rational};

/// 流信息
#[derive(Debug, Clone)]
pub struct Stream {
    /// 流索引 (在容器中的位置, 从 0 开始)
    pub index: usize,
    /// 媒体类型
    pub media_type: MediaType,
    /// 编解码器标识
    pub codec_id: CodecId,
    /// 时间基
    pub time_base: Rational,
    /// 流特定参数
    pub params: StreamParams,
}

/// 流特定参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamParams {
    /// 音频流参数
    Audio(AudioStreamParams),
    /// 无额外参数 (视频流与数据流)
    Other,
}

/// 音频流参数
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioStreamParams {
    /// 采样率 (Hz, 0 表示未知)
    pub sample_rate: u32,
    /// 声道数 (0 表示未知)
    pub channels: u32,
    /// 每个编码采样的位数 (0 表示未知)
    pub bits_per_coded_sample: u32,
    /// 码率 (bps, 0 表示未知)
    pub bit_rate: u64,
    /// 编码档次
    pub profile: AudioProfile,
}

impl Stream {
    /// 获取音频参数 (如果是音频流)
    pub fn audio(&self) -> Option<&AudioStreamParams> {
        match &self.params {
            StreamParams::Audio(a) => Some(a),
            StreamParams::Other => None,
        }
    }
}

/// 流注册表
///
/// 解封装器通过它查找或创建逻辑流. 约定: 同一 `(media_type, codec_id)` 只对应一条流,
/// 第一次出现时创建, 之后始终返回同一个索引.
pub trait StreamRegistry {
    /// 查找已有的流, 返回流索引
    fn find_stream(&self, media_type: MediaType, codec_id: CodecId) -> Option<usize>;

    /// 创建新流, 返回流索引
    fn create_stream(
        &mut self,
        media_type: MediaType,
        codec_id: CodecId,
        time_base: Rational,
        params: StreamParams,
    ) -> usize;
}

impl StreamRegistry for Vec<Stream> {
    fn find_stream(&self, media_type: MediaType, codec_id: CodecId) -> Option<usize> {
        self.iter()
            .find(|s| s.media_type == media_type && s.codec_id == codec_id)
            .map(|s| s.index)
    }

    fn create_stream(
        &mut self,
        media_type: MediaType,
        codec_id: CodecId,
        time_base: Rational,
        params: StreamParams,
    ) -> usize {
        let index = self.len();
        self.push(Stream {
            index,
            media_type,
            codec_id,
            time_base,
            params,
        });
        index
    }
}
