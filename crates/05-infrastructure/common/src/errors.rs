//! 错误类型定义

use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置文件读取失败: {source}")]
    FileReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("配置解析失败: {source}")]
    ParseError {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("配置序列化失败: {source}")]
    SerializationError {
        #[from]
        source: serde_json::Error,
    },

    #[error("配置键不存在: {key}")]
    KeyNotFound { key: String },

    #[error("无法解析占位符 {placeholder}: 配置键 {key} 不存在")]
    PlaceholderUnresolved { placeholder: String, key: String },

    #[error("资源不存在: {name}")]
    ResourceNotFound { name: String },
}

impl ConfigError {
    /// 创建解析错误
    pub fn parse_error(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::ParseError {
            source: Box::new(source),
        }
    }
}

/// 类型转换错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("不支持的类型转换: {value} -> {target}")]
    Unsupported { value: String, target: String },

    #[error("类型转换失败: {value} -> {target}, 原因: {message}")]
    Failed {
        value: String,
        target: String,
        message: String,
    },
}

impl ConversionError {
    /// 创建不支持的转换错误
    pub fn unsupported(value: impl Into<String>, target: impl Into<String>) -> Self {
        Self::Unsupported {
            value: value.into(),
            target: target.into(),
        }
    }

    /// 创建转换失败错误
    pub fn failed(
        value: impl Into<String>,
        target: impl Into<String>,
        message: impl ToString,
    ) -> Self {
        Self::Failed {
            value: value.into(),
            target: target.into(),
            message: message.to_string(),
        }
    }
}

/// 依赖注入错误类型
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("组件定义冲突: {name} 已注册")]
    Conflict { name: String },

    #[error("检测到循环创建: {name}, 创建链: {chain}")]
    CircularCreation { name: String, chain: String },

    #[error("找不到组件: {description}")]
    NoSuchComponent { description: String },

    #[error("组件不唯一: {type_name}, 候选组件: {candidates:?}")]
    AmbiguousComponent {
        type_name: String,
        candidates: Vec<String>,
    },

    #[error("组件类型不匹配: {name}, 期望 {expected}, 实际 {actual}")]
    TypeMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("类型转换错误: {source}")]
    Conversion {
        #[from]
        source: ConversionError,
    },

    #[error("组件创建失败: {name}, 原因: {source}")]
    ComponentCreationFailed {
        name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("参数无效: {message}")]
    InvalidArgument { message: String },

    #[error("未知的组件类型: {name}")]
    UnknownType { name: String },

    #[error("事件分发失败: {event}, 原因: {message}")]
    EventDispatchFailed { event: String, message: String },

    #[error("配置错误: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("非法状态: {message}")]
    IllegalState { message: String },
}

impl DependencyError {
    /// 创建组件不存在错误
    pub fn no_such_component(description: impl Into<String>) -> Self {
        Self::NoSuchComponent {
            description: description.into(),
        }
    }

    /// 创建组件创建失败错误
    pub fn creation_failed(
        name: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ComponentCreationFailed {
            name: name.into(),
            source: source.into(),
        }
    }

    /// 创建非法状态错误
    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::IllegalState {
            message: message.into(),
        }
    }

    /// 是否为循环创建错误
    pub fn is_circular(&self) -> bool {
        matches!(self, Self::CircularCreation { .. })
    }
}

/// 基础设施错误类型
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("配置错误: {source}")]
    ConfigError {
        #[from]
        source: ConfigError,
    },

    #[error("依赖注入错误: {source}")]
    DependencyError {
        #[from]
        source: DependencyError,
    },

    #[error("基础设施启动失败: {message}")]
    BootstrapFailed { message: String },

    #[error("基础设施关闭失败: {message}")]
    ShutdownFailed { message: String },
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type ConversionResult<T> = Result<T, ConversionError>;
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;
