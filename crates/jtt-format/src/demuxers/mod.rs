//! 解封装器实现模块.

pub mod jtt1078;

use crate::format_id::FormatId;
use crate::registry::FormatRegistry;

/// 注册所有内置解封装器
pub fn register_all_demuxers(registry: &mut FormatRegistry) {
    registry.register_demuxer(FormatId::Jtt1078, "jtt1078", jtt1078::Jtt1078Demuxer::create);
    registry.register_probe(Box::new(jtt1078::Jtt1078Probe));
}
