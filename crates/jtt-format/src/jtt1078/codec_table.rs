//! 负载类型/数据类型与编解码器标识之间的映射表.

use jtt_codec::{AudioProfile, CodecId};
use jtt_core::MediaType;

use super::types::{DataType, PayloadType};
use crate::stream::{AudioStreamParams, StreamParams};

/// 协议音频的默认采样率
const AUDIO_SAMPLE_RATE: u32 = 8000;

/// 数据类型对应的媒体类型
pub const fn data_type_to_media_type(data_type: DataType) -> MediaType {
    match data_type {
        DataType::VideoI | DataType::VideoP | DataType::VideoB => MediaType::Video,
        DataType::Audio => MediaType::Audio,
        DataType::Raw => MediaType::Data,
    }
}

/// 负载类型对应的编解码器, 没有对应编解码器时返回 `CodecId::None`
pub const fn payload_type_to_codec_id(payload_type: PayloadType) -> CodecId {
    match payload_type {
        PayloadType::H264 => CodecId::H264,
        PayloadType::H265 => CodecId::H265,
        PayloadType::Avs => CodecId::Cavs,
        PayloadType::Aac | PayloadType::AacLc | PayloadType::HeAac => CodecId::Aac,
        PayloadType::G711A => CodecId::PcmAlaw,
        PayloadType::G711U => CodecId::PcmMulaw,
        PayloadType::G722 => CodecId::AdpcmG722,
        PayloadType::G723 => CodecId::G723_1,
        PayloadType::G726 => CodecId::AdpcmG726le,
        PayloadType::G729 | PayloadType::G729A => CodecId::G729,
        PayloadType::Mp3 | PayloadType::MpegAudio => CodecId::Mp3,
        PayloadType::AdpcmA => CodecId::AdpcmYamaha,
        PayloadType::Amr => CodecId::AmrNb,
        PayloadType::S16beMono | PayloadType::S16beStereo => CodecId::PcmS16be,
        _ => CodecId::None,
    }
}

/// 封装时由编解码器选择负载类型
///
/// AAC 按档次区分 (LC → AAC-LC, HE/HEv2 → HE-AAC, 其余 → AAC),
/// 16 位大端 PCM 按声道数区分. 无法封装的编解码器返回 `None`.
pub const fn codec_id_to_payload_type(
    codec_id: CodecId,
    profile: AudioProfile,
    channels: u32,
) -> Option<PayloadType> {
    let pt = match codec_id {
        CodecId::H264 => PayloadType::H264,
        CodecId::H265 => PayloadType::H265,
        CodecId::Cavs => PayloadType::Avs,
        CodecId::Aac => {
            if matches!(profile, AudioProfile::AacLow) {
                PayloadType::AacLc
            } else if profile.is_he_aac() {
                PayloadType::HeAac
            } else {
                PayloadType::Aac
            }
        }
        CodecId::PcmAlaw => PayloadType::G711A,
        CodecId::PcmMulaw => PayloadType::G711U,
        CodecId::AdpcmG722 => PayloadType::G722,
        CodecId::G723_1 => PayloadType::G723,
        CodecId::AdpcmG726le => PayloadType::G726,
        CodecId::G729 => PayloadType::G729,
        CodecId::Mp3 => PayloadType::Mp3,
        CodecId::AdpcmYamaha => PayloadType::AdpcmA,
        CodecId::AmrNb => PayloadType::Amr,
        CodecId::PcmS16be => {
            if channels == 2 {
                PayloadType::S16beStereo
            } else {
                PayloadType::S16beMono
            }
        }
        _ => return None,
    };
    Some(pt)
}

/// 首次出现某条逻辑流时, 由负载类型推导流参数
///
/// `data_length` 为触发创建的分片数据体长度 (已去掉厂商子头), 用于推算 G.726 的码字位数.
pub fn stream_params_for(payload_type: PayloadType, data_length: u16) -> StreamParams {
    match payload_type {
        PayloadType::G711A | PayloadType::G711U => StreamParams::Audio(AudioStreamParams {
            sample_rate: AUDIO_SAMPLE_RATE,
            channels: 1,
            ..Default::default()
        }),
        PayloadType::G726 => {
            let bits = u32::from(data_length / 40);
            StreamParams::Audio(AudioStreamParams {
                sample_rate: AUDIO_SAMPLE_RATE,
                channels: 1,
                bits_per_coded_sample: bits,
                bit_rate: u64::from(AUDIO_SAMPLE_RATE) * u64::from(bits),
                ..Default::default()
            })
        }
        PayloadType::S16beMono | PayloadType::S16beStereo => {
            let channels = if payload_type == PayloadType::S16beStereo { 2 } else { 1 };
            StreamParams::Audio(AudioStreamParams {
                sample_rate: AUDIO_SAMPLE_RATE,
                channels,
                bits_per_coded_sample: 16,
                ..Default::default()
            })
        }
        PayloadType::AacLc => StreamParams::Audio(AudioStreamParams {
            profile: AudioProfile::AacLow,
            ..Default::default()
        }),
        PayloadType::HeAac => StreamParams::Audio(AudioStreamParams {
            profile: AudioProfile::AacHe,
            ..Default::default()
        }),
        _ if payload_type_to_codec_id(payload_type).media_type() == MediaType::Audio => {
            StreamParams::Audio(AudioStreamParams::default())
        }
        _ => StreamParams::Other,
    }
}
