//! 时间戳常量与毫秒换算.

use crate::rational::Rational;

/// 表示"未定义"的时间戳值
pub const NOPTS_VALUE: i64 = i64::MIN;

/// 把以 `time_base` 为单位的时间戳换算为毫秒
///
/// 时间戳未定义或时间基无效时返回 `None`.
pub fn to_millis(ts: i64, time_base: Rational) -> Option<i64> {
    if ts == NOPTS_VALUE {
        return None;
    }
    Rational::rescale(ts, time_base, Rational::MILLI)
}
