//! 解封装器 (Demuxer) trait 定义.
//!
//! 对标 FFmpeg 的 `AVInputFormat`, 定义了从容器格式中读取数据包的接口.

use jtt_codec::Packet;
use jtt_core::JttResult;

use crate::format_id::FormatId;
use crate::io::IoContext;
use crate::stream::Stream;

/// 解封装器 trait
///
/// 使用流程:
/// 1. 调用 `open()` 打开容器
/// 2. 循环调用 `read_packet()` 读取数据包
/// 3. 调用 `streams()` 获取流信息 (无头部的格式在读包过程中才会建立流)
pub trait Demuxer: Send {
    /// 获取格式标识
    fn format_id(&self) -> FormatId;

    /// 获取格式名称
    fn name(&self) -> &str;

    /// 打开容器并解析头部信息
    fn open(&mut self, io: &mut IoContext) -> JttResult<()>;

    /// 获取目前已知的所有流
    fn streams(&self) -> &[Stream];

    /// 读取下一个数据包
    ///
    /// # 返回
    /// - `Ok(packet)`: 成功读取一个数据包
    /// - `Err(JttError::Eof)`: 已到达输入末尾
    fn read_packet(&mut self, io: &mut IoContext) -> JttResult<Packet>;

    /// 获取容器时长 (秒), None 表示未知
    fn duration(&self) -> Option<f64> {
        None
    }
}
