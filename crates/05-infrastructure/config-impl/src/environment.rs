//! 标准属性环境实现

use config_abstractions::{replace_placeholders, Environment, PropertySource};
use infrastructure_common::ConfigResult;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// 标准属性环境
///
/// 按顺序查找属性源，第一个包含该键的属性源生效。同名属性源只保留一个。
#[derive(Default)]
pub struct StandardEnvironment {
    sources: RwLock<Vec<Arc<dyn PropertySource>>>,
}

impl StandardEnvironment {
    /// 创建空的属性环境
    pub fn new() -> Self {
        Self::default()
    }

    /// 将属性源添加到最高优先级
    pub fn add_first(&self, source: Arc<dyn PropertySource>) {
        let mut sources = self.sources.write();
        sources.retain(|s| s.name() != source.name());
        debug!("添加属性源(最高优先级): {}", source.name());
        sources.insert(0, source);
    }

    /// 将属性源添加到最低优先级
    pub fn add_last(&self, source: Arc<dyn PropertySource>) {
        let mut sources = self.sources.write();
        sources.retain(|s| s.name() != source.name());
        debug!("添加属性源(最低优先级): {}", source.name());
        sources.push(source);
    }

    /// 移除属性源
    pub fn remove(&self, name: &str) -> Option<Arc<dyn PropertySource>> {
        let mut sources = self.sources.write();
        let index = sources.iter().position(|s| s.name() == name)?;
        Some(sources.remove(index))
    }

    /// 是否包含指定名称的属性源
    pub fn contains_source(&self, name: &str) -> bool {
        self.sources.read().iter().any(|s| s.name() == name)
    }

    /// 按优先级返回属性源名称
    pub fn source_names(&self) -> Vec<String> {
        self.sources
            .read()
            .iter()
            .map(|s| s.name().to_string())
            .collect()
    }
}

impl Environment for StandardEnvironment {
    fn get_property(&self, key: &str) -> Option<String> {
        self.sources
            .read()
            .iter()
            .find_map(|source| source.get_property(key))
    }

    fn contains_property(&self, key: &str) -> bool {
        self.sources
            .read()
            .iter()
            .any(|source| source.contains_property(key))
    }

    fn resolve_placeholders(&self, text: &str) -> String {
        // 非必需模式下替换不会失败
        replace_placeholders(text, |key| self.get_property(key), false)
            .unwrap_or_else(|_| text.to_string())
    }

    fn resolve_required_placeholders(&self, text: &str) -> ConfigResult<String> {
        replace_placeholders(text, |key| self.get_property(key), true)
    }
}

impl std::fmt::Debug for StandardEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandardEnvironment")
            .field("sources", &self.source_names())
            .finish()
    }
}
