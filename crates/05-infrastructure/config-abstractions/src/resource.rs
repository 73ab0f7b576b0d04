//! 资源加载抽象接口

use infrastructure_common::{ConfigError, ConfigResult};

/// 资源 trait
pub trait Resource: Send + Sync {
    /// 资源名称
    fn name(&self) -> &str;

    /// 资源是否存在
    fn exists(&self) -> bool;

    /// 读取资源内容
    fn read_bytes(&self) -> ConfigResult<Vec<u8>>;

    /// 按行读取资源内容
    fn read_lines(&self) -> ConfigResult<Vec<String>> {
        let bytes = self.read_bytes()?;
        let text = String::from_utf8(bytes).map_err(ConfigError::parse_error)?;
        Ok(text.lines().map(str::to_string).collect())
    }
}

/// 资源加载器 trait
pub trait ResourceLoader: Send + Sync {
    /// 获取指定名称的资源，资源不存在时返回的资源 `exists()` 为假
    fn get_resource(&self, name: &str) -> Box<dyn Resource>;
}
