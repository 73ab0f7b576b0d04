//! 属性源抽象接口

/// 属性源 trait
///
/// 以名称标识的一组键值配置，键使用 `.` 分隔的层级形式，例如 `server.port`。
pub trait PropertySource: Send + Sync {
    /// 获取属性源名称
    fn name(&self) -> &str;

    /// 获取属性值
    fn get_property(&self, key: &str) -> Option<String>;

    /// 检查是否包含属性
    fn contains_property(&self, key: &str) -> bool {
        self.get_property(key).is_some()
    }

    /// 获取所有属性键
    fn property_names(&self) -> Vec<String>;
}
