//! # jtt-format
//!
//! JT/T 1078 容器格式库, 提供封装/解封装框架与 JT/T 1078 码流的读写实现.
//!
//! 本 crate 对标 FFmpeg 的 libavformat. 框架部分 (I/O、流表、注册表、探测)
//! 与具体格式无关; `jtt1078` 模块定义协议字段与编解码器映射,
//! `demuxers`/`muxers` 模块分别实现分片重组与分片切割.

pub mod demuxer;
pub mod demuxers;
pub mod format_id;
pub mod io;
pub mod jtt1078;
pub mod muxer;
pub mod muxers;
pub mod probe;
pub mod registry;
pub mod stream;

// 重导出常用类型
pub use demuxer::Demuxer;
pub use format_id::FormatId;
pub use io::IoContext;
pub use muxer::Muxer;
pub use probe::ProbeResult;
pub use registry::FormatRegistry;
pub use stream::{Stream, StreamRegistry};

/// 注册所有内置容器格式
pub fn register_all(registry: &mut FormatRegistry) {
    demuxers::register_all_demuxers(registry);
    muxers::register_all_muxers(registry);
}
