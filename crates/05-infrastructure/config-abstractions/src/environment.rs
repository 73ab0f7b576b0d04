//! 属性环境抽象接口

use infrastructure_common::{ConfigError, ConfigResult};

/// 属性环境 trait
///
/// 由有序的属性源链组成，第一个包含该键的属性源生效。
pub trait Environment: Send + Sync {
    /// 获取属性值
    fn get_property(&self, key: &str) -> Option<String>;

    /// 检查是否包含属性
    fn contains_property(&self, key: &str) -> bool {
        self.get_property(key).is_some()
    }

    /// 获取属性值，不存在时返回默认值
    fn get_property_or(&self, key: &str, default: &str) -> String {
        self.get_property(key).unwrap_or_else(|| default.to_string())
    }

    /// 获取必需的属性值
    fn get_required_property(&self, key: &str) -> ConfigResult<String> {
        self.get_property(key).ok_or_else(|| ConfigError::KeyNotFound {
            key: key.to_string(),
        })
    }

    /// 替换 `${...}` 占位符，属性不存在时替换为空字符串
    fn resolve_placeholders(&self, text: &str) -> String;

    /// 替换 `${...}` 占位符，属性不存在时返回错误
    fn resolve_required_placeholders(&self, text: &str) -> ConfigResult<String>;
}
