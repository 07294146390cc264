//! 统一错误类型定义.
//!
//! 所有 jtt crate 共用的错误类型, 支持跨模块传播.

use thiserror::Error;

/// 统一错误类型
#[derive(Debug, Error)]
pub enum JttError {
    /// 无效参数 (配置错误等)
    #[error("无效参数: {0}")]
    InvalidArgument(String),

    /// 不支持的操作 (协议版本、编解码器无映射等)
    #[error("不支持的操作: {0}")]
    Unsupported(String),

    /// I/O 错误
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 已到达流末尾
    #[error("已到达流末尾")]
    Eof,

    /// 未找到指定的容器格式
    #[error("未找到容器格式: {0}")]
    FormatNotFound(String),

    /// 未找到指定的流
    #[error("未找到流: 索引 {0}")]
    StreamNotFound(usize),

    /// 无效数据 (损坏的码流等)
    #[error("无效数据: {0}")]
    InvalidData(String),
}

impl JttError {
    /// 将 `Eof` 转换为 `UnexpectedEof` I/O 错误
    ///
    /// 用于一个结构已经读取了一部分之后遇到数据不足的场景:
    /// 此时的流末尾不是干净的结束, 而是截断.
    pub fn truncated(self, what: &str) -> Self {
        match self {
            Self::Eof => Self::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("{what} 被截断"),
            )),
            other => other,
        }
    }
}

/// 统一 Result 类型
pub type JttResult<T> = Result<T, JttError>;
