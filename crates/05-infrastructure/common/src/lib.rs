//! # Infrastructure Common
//!
//! 这个 crate 提供了组件容器各层共享的基础类型。
//!
//! ## 核心内容
//!
//! - [`DependencyError`] / [`ConversionError`] / [`ConfigError`] - 错误分类
//! - [`TypeInfo`] - 类型元数据
//! - [`Scope`] / [`ContextState`] - 作用域与容器状态
//! - [`default_component_name`] - 组件命名约定

pub mod conventions;
pub mod errors;
pub mod lifecycle;
pub mod metadata;

pub use conventions::*;
pub use errors::*;
pub use lifecycle::*;
pub use metadata::*;
