//! 资源加载器实现

use config_abstractions::{Resource, ResourceLoader};
use infrastructure_common::{ConfigError, ConfigResult};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// 文件系统资源
#[derive(Debug, Clone)]
pub struct FileResource {
    name: String,
    path: PathBuf,
}

impl Resource for FileResource {
    fn name(&self) -> &str {
        &self.name
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn read_bytes(&self) -> ConfigResult<Vec<u8>> {
        if !self.exists() {
            return Err(ConfigError::ResourceNotFound {
                name: self.name.clone(),
            });
        }
        Ok(std::fs::read(&self.path)?)
    }
}

/// 以某个目录为根的文件系统资源加载器
#[derive(Debug, Clone)]
pub struct FileSystemResourceLoader {
    root: PathBuf,
}

impl FileSystemResourceLoader {
    /// 创建新的文件系统资源加载器
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 根目录
    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

impl ResourceLoader for FileSystemResourceLoader {
    fn get_resource(&self, name: &str) -> Box<dyn Resource> {
        Box::new(FileResource {
            name: name.to_string(),
            path: self.root.join(name.trim_start_matches('/')),
        })
    }
}

/// 内存资源
#[derive(Debug, Clone)]
pub struct MemoryResource {
    name: String,
    content: Option<Arc<[u8]>>,
}

impl Resource for MemoryResource {
    fn name(&self) -> &str {
        &self.name
    }

    fn exists(&self) -> bool {
        self.content.is_some()
    }

    fn read_bytes(&self) -> ConfigResult<Vec<u8>> {
        self.content
            .as_ref()
            .map(|bytes| bytes.to_vec())
            .ok_or_else(|| ConfigError::ResourceNotFound {
                name: self.name.clone(),
            })
    }
}

/// 内存资源加载器
#[derive(Debug, Default)]
pub struct InMemoryResourceLoader {
    resources: RwLock<HashMap<String, Arc<[u8]>>>,
}

impl InMemoryResourceLoader {
    /// 创建空的内存资源加载器
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加文本资源
    pub fn with_text(self, name: impl Into<String>, text: impl AsRef<str>) -> Self {
        self.insert(name, text.as_ref().as_bytes());
        self
    }

    /// 添加或替换资源
    pub fn insert(&self, name: impl Into<String>, content: &[u8]) {
        self.resources.write().insert(name.into(), Arc::from(content));
    }
}

impl ResourceLoader for InMemoryResourceLoader {
    fn get_resource(&self, name: &str) -> Box<dyn Resource> {
        Box::new(MemoryResource {
            name: name.to_string(),
            content: self.resources.read().get(name).cloned(),
        })
    }
}
