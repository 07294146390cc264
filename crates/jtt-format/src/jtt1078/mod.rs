//! JT/T 1078 协议定义.
//!
//! JT/T 1078-2016 《道路运输车辆卫星定位系统视频通讯协议》中的实时音视频流
//! 打包格式. 每个访问单元 (一帧视频/音频) 被切成若干个负载不超过 950 字节的
//! 分片, 每个分片带一个定长前导和按数据类型变化的时间字段.
//!
//! # 分片结构 (大端)
//! ```text
//! 偏移  长度  字段
//!  0     4    帧头标识 0x30 0x31 0x63 0x64
//!  4     1    V(2) P(1) X(1) CC(4), 固定 0b1000_0001
//!  5     1    M(1) 帧边界标识 + PT(7) 负载类型
//!  6     2    包序号, 65535 后回绕到 0
//!  8     6    SIM 卡号, 12 位十六进制数字紧凑存放
//! 14     1    逻辑通道号
//! 15     1    数据类型(4) + 分包处理标记(4)
//! 16     8    时间戳 (毫秒), 透传数据无此字段
//! 24     2    距上一关键帧的间隔 (毫秒), 仅视频
//! 26     2    距上一帧的间隔 (毫秒), 仅视频
//!  n     2    数据体长度, 不超过 950
//! n+2    -    数据体
//! ```

pub mod codec_table;
pub mod config;
pub mod header;
pub mod types;

pub use config::{DeviceId, Jtt1078Config};
pub use header::PacketHeader;
pub use types::{DataType, PacketType, PayloadType};

/// 帧头标识
pub const MAGIC: [u8; 4] = [0x30, 0x31, 0x63, 0x64];

/// 第 5 字节的固定取值: V=2, P=0, X=0, CC=1
pub const VERSION_BYTE: u8 = 0b1000_0001;

/// 单个分片负载的最大长度
pub const MAX_PAYLOAD_SIZE: usize = 950;

/// 唯一支持的协议版本 (发布年份)
pub const SUPPORTED_VERSION: u32 = 2016;

/// 定长前导的长度 (偏移 0..16)
pub const PREAMBLE_SIZE: usize = 16;
