//! # jtt1078
//!
//! 纯 Rust 实现的 JT/T 1078 车载视频传输协议封装/解封装库.
//!
//! JT/T 1078 把每一帧视频或音频切成若干个不超过 950 字节的分片, 以帧边界标识
//! 标记最后一个分片. 本库提供:
//! - **解封装**: 从任意字节流中读取分片, 按逻辑流重组为完整的访问单元
//! - **封装**: 把访问单元切片, 写出带时间间隔字段的分片序列
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use jtt1078::core::JttError;
//! use jtt1078::format::IoContext;
//!
//! let registry = jtt1078::default_format_registry();
//! let mut io = IoContext::open_read("capture.1078").unwrap();
//! let mut demuxer = registry.open_input(&mut io, Some("capture.1078")).unwrap();
//! loop {
//!     match demuxer.read_packet(&mut io) {
//!         Ok(pkt) => println!("流 #{} pts={} ms, {} 字节", pkt.stream_index, pkt.pts, pkt.size()),
//!         Err(JttError::Eof) => break,
//!         Err(e) => panic!("{e}"),
//!     }
//! }
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `jtt-core` | 错误类型、时间基与时间戳 |
//! | `jtt-codec` | 编解码器标识与数据包 |
//! | `jtt-format` | I/O、流表、注册表与 JT/T 1078 封装/解封装 |

/// 核心类型与工具 (对标 libavutil)
pub use jtt_core as core;

/// 编解码器标识与数据包 (对标 libavcodec 的数据结构部分)
pub use jtt_codec as codec;

/// 容器格式框架 (对标 libavformat)
pub use jtt_format as format;

/// 获取版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// 创建已注册所有内置容器格式的注册表
pub fn default_format_registry() -> jtt_format::FormatRegistry {
    let mut registry = jtt_format::FormatRegistry::new();
    jtt_format::register_all(&mut registry);
    registry
}
