//! 容器格式注册表.
//!
//! 管理所有已注册的解封装器/封装器, 支持按格式标识查找和自动探测.

use std::collections::HashMap;

use jtt_core::{JttError, JttResult};

use crate::demuxer::Demuxer;
use crate::format_id::FormatId;
use crate::io::IoContext;
use crate::muxer::Muxer;
use crate::probe::{FormatProbe, ProbeResult};

/// 解封装器工厂函数类型
pub type DemuxerFactory = fn() -> JttResult<Box<dyn Demuxer>>;

/// 封装器工厂函数类型
pub type MuxerFactory = fn() -> JttResult<Box<dyn Muxer>>;

/// 探测时最多查看的字节数
const PROBE_SIZE: usize = 2048;

/// 容器格式注册表
pub struct FormatRegistry {
    /// 解封装器工厂映射
    demuxers: HashMap<FormatId, (String, DemuxerFactory)>,
    /// 封装器工厂映射
    muxers: HashMap<FormatId, (String, MuxerFactory)>,
    /// 格式探测器列表
    probes: Vec<Box<dyn FormatProbe + Send>>,
}

impl FormatRegistry {
    /// 创建空的注册表
    pub fn new() -> Self {
        Self {
            demuxers: HashMap::new(),
            muxers: HashMap::new(),
            probes: Vec::new(),
        }
    }

    /// 注册一个解封装器
    pub fn register_demuxer(
        &mut self,
        format_id: FormatId,
        name: impl Into<String>,
        factory: DemuxerFactory,
    ) {
        self.demuxers.insert(format_id, (name.into(), factory));
    }

    /// 注册一个封装器
    pub fn register_muxer(
        &mut self,
        format_id: FormatId,
        name: impl Into<String>,
        factory: MuxerFactory,
    ) {
        self.muxers.insert(format_id, (name.into(), factory));
    }

    /// 注册一个格式探测器
    pub fn register_probe(&mut self, probe: Box<dyn FormatProbe + Send>) {
        self.probes.push(probe);
    }

    /// 创建指定格式的解封装器实例
    pub fn create_demuxer(&self, format_id: FormatId) -> JttResult<Box<dyn Demuxer>> {
        let (_, factory) = self
            .demuxers
            .get(&format_id)
            .ok_or_else(|| JttError::FormatNotFound(format!("未找到 {format_id} 的解封装器")))?;
        factory()
    }

    /// 创建指定格式的封装器实例
    pub fn create_muxer(&self, format_id: FormatId) -> JttResult<Box<dyn Muxer>> {
        let (_, factory) = self
            .muxers
            .get(&format_id)
            .ok_or_else(|| JttError::FormatNotFound(format!("未找到 {format_id} 的封装器")))?;
        factory()
    }

    /// 探测数据的容器格式
    ///
    /// 遍历所有已注册的探测器, 返回置信度最高的结果.
    pub fn probe(&self, data: &[u8], filename: Option<&str>) -> Option<ProbeResult> {
        let mut best: Option<ProbeResult> = None;
        for probe in &self.probes {
            if let Some(score) = probe.probe(data, filename) {
                let is_better = best.as_ref().is_none_or(|b| score > b.score);
                if is_better {
                    best = Some(ProbeResult {
                        format_id: probe.format_id(),
                        score,
                    });
                }
            }
        }
        best
    }

    /// 获取所有已注册的解封装器名称
    pub fn list_demuxers(&self) -> Vec<(FormatId, &str)> {
        self.demuxers
            .iter()
            .map(|(id, (name, _))| (*id, name.as_str()))
            .collect()
    }

    /// 获取所有已注册的封装器名称
    pub fn list_muxers(&self) -> Vec<(FormatId, &str)> {
        self.muxers
            .iter()
            .map(|(id, (name, _))| (*id, name.as_str()))
            .collect()
    }

    /// 探测输入格式 (不打开解封装器)
    ///
    /// 通过前瞻缓冲区查看头部数据, 不消耗输入, 因此也适用于不可 seek 的输入.
    pub fn probe_input(
        &self,
        io: &mut IoContext,
        filename: Option<&str>,
    ) -> JttResult<ProbeResult> {
        let head = io.peek_available(PROBE_SIZE)?;
        self.probe(head, filename)
            .ok_or_else(|| JttError::FormatNotFound("无法识别输入格式".to_string()))
    }

    /// 自动探测格式并创建、打开解封装器
    pub fn open_input(
        &self,
        io: &mut IoContext,
        filename: Option<&str>,
    ) -> JttResult<Box<dyn Demuxer>> {
        let result = self.probe_input(io, filename)?;
        let mut demuxer = self.create_demuxer(result.format_id)?;
        demuxer.open(io)?;
        Ok(demuxer)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}
