//! # 依赖注入具体实现
//!
//! 提供组件容器、定义注册表、类型转换服务、事件发布器、
//! 内置后处理器以及配置模块解析的具体实现。
//!
//! ## 组成
//!
//! - [`GenericDefinitionRegistry`] - 保持注册顺序的定义注册表
//! - [`GenericComponentContainer`] - 单例缓存、循环创建检测与首选组件裁决
//! - [`GenericConversionService`] - 带缓存的类型转换服务
//! - [`GenericEventPublisher`] - 同步事件发布器
//! - [`ConfigurationProcessor`] - 配置模块展开

pub mod configuration;
pub mod container;
pub mod conversion;
pub mod event;
pub mod processors;
pub mod registry;

pub use configuration::*;
pub use container::*;
pub use conversion::*;
pub use event::*;
pub use processors::*;
pub use registry::*;
