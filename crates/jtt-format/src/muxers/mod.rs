//! 封装器实现模块.

pub mod jtt1078;

use crate::format_id::FormatId;
use crate::registry::FormatRegistry;

/// 注册所有内置封装器
pub fn register_all_muxers(registry: &mut FormatRegistry) {
    registry.register_muxer(FormatId::Jtt1078, "jtt1078", jtt1078::Jtt1078Muxer::create);
}
