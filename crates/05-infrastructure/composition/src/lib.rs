//! # 基础设施组合层
//!
//! 把属性环境、组件容器、配置解析与事件发布组合成可刷新的应用上下文。
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use di_abstractions::{ComponentContainerExt, ComponentType};
//! use infrastructure_composition::{ApplicationContext, LoggingConfig};
//!
//! #[derive(Default)]
//! struct Greeter;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let context = ApplicationContext::builder()
//!         .add_config_toml("config.toml")?
//!         .register_type(ComponentType::builder::<Greeter>().default_constructor().build())
//!         .with_logging(LoggingConfig::development())
//!         .build()?;
//!
//!     context.refresh()?;
//!     let _greeter = context.require_bean::<Greeter>("greeter")?;
//!     context.close()?;
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod context;

// 重新导出主要类型
pub use builder::{ApplicationContextBuilder, LoggingConfig};
pub use context::*;

// 重新导出错误类型
pub use infrastructure_common::InfrastructureError;
