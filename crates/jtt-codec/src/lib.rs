//! # jtt-codec
//!
//! 编解码器标识与压缩数据包 (Packet) 抽象.
//!
//! 本库只封装/解封装不透明的压缩数据, 不包含任何解码器或编码器;
//! 这里定义的是容器层需要知道的编解码器信息.

pub mod codec_id;
pub mod packet;
pub mod profile;

// 重导出常用类型
pub use codec_id::CodecId;
pub use packet::{Packet, PacketFlags, PictureType};
pub use profile::AudioProfile;
