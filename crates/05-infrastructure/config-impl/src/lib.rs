//! # Configuration Implementation
//!
//! 配置的具体实现，提供属性源、属性环境和资源加载器。
//!
//! ## 主要组件
//!
//! - [`StandardEnvironment`] - 有序属性源链
//! - [`MapPropertySource`] - 内存属性源
//! - [`TomlPropertySource`] / [`JsonPropertySource`] - 文件属性源
//! - [`EnvironmentVariablePropertySource`] - 环境变量属性源
//! - [`FileSystemResourceLoader`] / [`InMemoryResourceLoader`] - 资源加载器

pub mod environment;
pub mod providers;
pub mod resource;

pub use environment::*;
pub use providers::*;
pub use resource::*;
