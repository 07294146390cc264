//! # jtt-core
//!
//! JT/T 1078 框架核心库, 提供基础类型定义、错误处理和时间基换算.
//!
//! 本 crate 的角色对应 FFmpeg 的 libavutil, 为上层 codec/format crate 提供底层基础设施.

pub mod error;
pub mod media_type;
pub mod rational;
pub mod timestamp;

// 重导出常用类型
pub use error::{JttError, JttResult};
pub use media_type::MediaType;
pub use rational::Rational;
