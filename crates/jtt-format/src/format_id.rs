//! 容器格式标识符.

use std::fmt;

/// 容器格式标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum FormatId {
    /// JT/T 1078 车载视频实时传输码流
    Jtt1078,
}

impl FormatId {
    /// 所有已知格式标识的列表
    pub const ALL: &[FormatId] = &[Self::Jtt1078];

    /// 获取格式的名称
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Jtt1078 => "jtt1078",
        }
    }

    /// 获取格式的完整描述
    pub const fn long_name(&self) -> &'static str {
        match self {
            Self::Jtt1078 => "JT/T 1078",
        }
    }

    /// 获取格式常用的文件扩展名
    pub const fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Jtt1078 => &["jtt", "1078"],
        }
    }

    /// 根据名称查找格式
    pub fn from_name(name: &str) -> Option<FormatId> {
        Self::ALL
            .iter()
            .find(|id| id.name().eq_ignore_ascii_case(name))
            .copied()
    }

    /// 从文件路径猜测格式
    pub fn from_filename(filename: &str) -> Option<FormatId> {
        let ext = filename.rsplit('.').next()?.to_lowercase();
        Self::ALL
            .iter()
            .find(|id| id.extensions().contains(&ext.as_str()))
            .copied()
    }
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(FormatId::from_name("JTT1078"), Some(FormatId::Jtt1078));
        assert_eq!(FormatId::from_filename("cam01.1078"), Some(FormatId::Jtt1078));
        assert_eq!(FormatId::from_filename("cam01.mp4"), None);
    }
}
