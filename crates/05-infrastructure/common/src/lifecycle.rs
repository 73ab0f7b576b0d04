//! 组件生命周期管理

use serde::{Deserialize, Serialize};
use std::fmt;

/// 组件作用域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// 单例模式 - 每个容器内只创建一个实例并缓存
    #[default]
    Singleton,
    /// 原型模式 - 每次请求都创建新实例，不缓存
    Prototype,
}

impl Scope {
    /// 是否为单例
    pub fn is_singleton(self) -> bool {
        matches!(self, Self::Singleton)
    }
}

/// 容器上下文状态
///
/// `Built -> Prepared -> Resolving -> Populating -> Ready`，
/// 解析或实例化阶段出错时进入 `Failed`，关闭后进入 `Closed`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContextState {
    /// 仅有注册表
    Built,
    /// 处理器与协作者已挂载
    Prepared,
    /// 正在展开配置模块
    Resolving,
    /// 正在实例化非延迟单例
    Populating,
    /// 刷新完成
    Ready,
    /// 刷新失败
    Failed,
    /// 已关闭
    Closed,
}

impl ContextState {
    /// 是否处于刷新过程中
    pub fn is_refreshing(self) -> bool {
        matches!(self, Self::Prepared | Self::Resolving | Self::Populating)
    }

    /// 是否为终止状态
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Failed | Self::Closed)
    }
}

impl fmt::Display for ContextState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Built => "Built",
            Self::Prepared => "Prepared",
            Self::Resolving => "Resolving",
            Self::Populating => "Populating",
            Self::Ready => "Ready",
            Self::Failed => "Failed",
            Self::Closed => "Closed",
        };
        f.write_str(text)
    }
}
