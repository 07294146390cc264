//! 封装/解封装选项.
//!
//! 对应 FFmpeg 中 JT/T 1078 格式的私有选项 `version`、`sim_no`、`channel_no`.

use std::fmt;
use std::str::FromStr;

use jtt_core::{JttError, JttResult};

use super::SUPPORTED_VERSION;

/// 逻辑通道号的取值范围
pub const CHANNEL_RANGE: std::ops::RangeInclusive<u8> = 1..=37;

/// 设备标识 (SIM 卡号)
///
/// 12 位十六进制数字, 每两位紧凑存放为一个字节, 共 6 字节.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DeviceId(pub [u8; 6]);

impl DeviceId {
    /// 线上字节
    pub const fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl FromStr for DeviceId {
    type Err = JttError;

    fn from_str(s: &str) -> JttResult<Self> {
        if s.len() != 12 {
            return Err(JttError::InvalidArgument(format!(
                "SIM 卡号必须是 12 个字符, 实际 {} 个: {s:?}",
                s.len()
            )));
        }
        let bytes = hex::decode(s).map_err(|e| {
            JttError::InvalidArgument(format!("SIM 卡号只能包含十六进制数字: {s:?} ({e})"))
        })?;
        <[u8; 6]>::try_from(bytes.as_slice())
            .map(Self)
            .map_err(|_| JttError::InvalidArgument(format!("SIM 卡号长度无效: {s:?}")))
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// JT/T 1078 选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Jtt1078Config {
    /// 协议发布年份, 目前只支持 2016
    pub version: u32,
    /// SIM 卡号 (12 个十六进制字符)
    pub sim_no: String,
    /// 逻辑通道号 (1~37)
    pub channel_no: u8,
}

impl Default for Jtt1078Config {
    fn default() -> Self {
        Self {
            version: SUPPORTED_VERSION,
            sim_no: "000000000000".to_string(),
            channel_no: 1,
        }
    }
}

/// 检查协议版本
pub fn check_version(version: u32) -> JttResult<()> {
    if version != SUPPORTED_VERSION {
        return Err(JttError::Unsupported(format!(
            "JT/T 1078 版本 {version} 尚未实现, 仅支持 {SUPPORTED_VERSION}"
        )));
    }
    Ok(())
}

impl Jtt1078Config {
    /// 校验全部选项, 返回解析后的设备标识
    pub fn validate(&self) -> JttResult<DeviceId> {
        check_version(self.version)?;
        if !CHANNEL_RANGE.contains(&self.channel_no) {
            return Err(JttError::InvalidArgument(format!(
                "逻辑通道号 {} 超出范围 {}~{}",
                self.channel_no,
                CHANNEL_RANGE.start(),
                CHANNEL_RANGE.end()
            )));
        }
        self.sim_no.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_id_parse() {
        let id: DeviceId = "013800138000".parse().unwrap();
        assert_eq!(id.as_bytes(), &[0x01, 0x38, 0x00, 0x13, 0x80, 0x00]);
        assert_eq!(id.to_string(), "013800138000");

        let id: DeviceId = "ABCDEF012345".parse().unwrap();
        assert_eq!(id.0, [0xAB, 0xCD, 0xEF, 0x01, 0x23, 0x45]);
    }

    #[test]
    fn test_device_id_rejects_bad_input() {
        assert!("01380013800".parse::<DeviceId>().is_err());
        assert!("01380013800G".parse::<DeviceId>().is_err());
        assert!("0138001380000".parse::<DeviceId>().is_err());
        assert!(matches!(
            "01380013800G".parse::<DeviceId>(),
            Err(JttError::InvalidArgument(_))
        ));
        // 12 字节但不是 12 个十六进制字符
        assert!(matches!(
            "0138001380é".parse::<DeviceId>(),
            Err(JttError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_device_id_display_lowercase_hex() {
        let id = DeviceId([0xAB, 0xCD, 0xEF, 0x00, 0x0A, 0xFF]);
        assert_eq!(id.to_string(), "abcdef000aff");
        assert_eq!(id.to_string().parse::<DeviceId>().unwrap(), id);
    }

    #[test]
    fn test_config_default_is_valid() {
        let id = Jtt1078Config::default().validate().unwrap();
        assert_eq!(id, DeviceId::default());
    }

    #[test]
    fn test_config_rejects_version() {
        let cfg = Jtt1078Config {
            version: 2019,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(JttError::Unsupported(_))));
    }

    #[test]
    fn test_config_rejects_channel() {
        for channel_no in [0u8, 38] {
            let cfg = Jtt1078Config {
                channel_no,
                ..Default::default()
            };
            assert!(matches!(cfg.validate(), Err(JttError::InvalidArgument(_))));
        }
    }
}
