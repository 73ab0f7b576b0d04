//! # Dependency Injection Abstractions
//!
//! 组件容器的抽象层，定义组件描述与容器协作的核心接口。
//!
//! ## 核心接口
//!
//! - [`ComponentType`] - 组件类型元数据，替代运行时反射
//! - [`ComponentDefinition`] - 组件定义
//! - [`ComponentFactory`] - 组件工厂
//! - [`DefinitionRegistry`] - 定义注册表
//! - [`ComponentContainer`] - 组件容器
//! - [`ComponentPostProcessor`] / [`RegistryPostProcessor`] - 后处理器
//! - [`ConfigurationResolver`] - 配置模块解析器
//! - [`ConversionService`] - 类型转换服务
//! - [`EventPublisher`] - 事件发布器

pub mod aware;
pub mod container;
pub mod conversion;
pub mod definition;
pub mod event;
pub mod factory;
pub mod injection;
pub mod instance;
pub mod metadata;
pub mod processor;
pub mod registry;

pub use aware::*;
pub use container::*;
pub use conversion::*;
pub use definition::*;
pub use event::*;
pub use factory::*;
pub use injection::*;
pub use instance::*;
pub use metadata::*;
pub use processor::*;
pub use registry::*;
