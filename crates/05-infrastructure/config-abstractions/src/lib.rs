//! # Configuration Abstractions
//!
//! 配置抽象层，定义组件容器所消费的外部协作者接口。
//!
//! ## 核心接口
//!
//! - [`PropertySource`] - 属性源接口
//! - [`Environment`] - 属性环境接口（有序属性源链 + 占位符解析）
//! - [`ResourceLoader`] / [`Resource`] - 资源加载接口
//! - [`placeholder`] - `${key:default}` 占位符解析

pub mod environment;
pub mod placeholder;
pub mod provider;
pub mod resource;

pub use environment::*;
pub use placeholder::{find_placeholders, has_placeholders, replace_placeholders, Placeholder};
pub use provider::*;
pub use resource::*;
