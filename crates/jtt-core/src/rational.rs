//! 有理数类型, 用于时间基 (time_base).
//!
//! 对标 FFmpeg 的 `AVRational` 与 `av_rescale_q`.

use std::fmt;

/// 有理数, 由分子和分母组成
///
/// JT/T 1078 的时间戳以毫秒为单位, 解封装出的流时间基固定为 1/1000;
/// 封装时需要把任意时间基的时间戳换算到毫秒.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    /// 分子
    pub num: i32,
    /// 分母
    pub den: i32,
}

impl Rational {
    /// 创建新的有理数
    pub const fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    /// 未定义 (分母为 0)
    pub const UNDEFINED: Self = Self { num: 0, den: 0 };

    /// 常用时间基: 毫秒 (1/1_000)
    pub const MILLI: Self = Self { num: 1, den: 1_000 };

    /// 判断是否有效 (分子分母均不为 0)
    pub const fn is_valid(&self) -> bool {
        self.den != 0 && self.num != 0
    }

    /// 转换为 f64 浮点数, 分母为 0 时返回 `f64::NAN`
    pub fn to_f64(self) -> f64 {
        if self.den == 0 {
            return f64::NAN;
        }
        f64::from(self.num) / f64::from(self.den)
    }

    /// 把以 `from` 为时间基的 `value` 换算到以 `to` 为时间基
    ///
    /// 四舍五入 (远离零方向), 中间结果用 i128 避免溢出.
    /// 任一时间基无效时返回 `None`.
    pub fn rescale(value: i64, from: Rational, to: Rational) -> Option<i64> {
        if !from.is_valid() || !to.is_valid() {
            return None;
        }
        let num = i128::from(value) * i128::from(from.num) * i128::from(to.den);
        let den = i128::from(from.den) * i128::from(to.num);
        let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
        let half = den / 2;
        let rounded = if num >= 0 {
            (num + half) / den
        } else {
            (num - half) / den
        };
        i64::try_from(rounded).ok()
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}
