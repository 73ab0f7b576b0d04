//! 应用事件抽象接口

use infrastructure_common::DependencyResult;
use std::any::Any;
use std::sync::Arc;

/// 应用事件
pub trait ApplicationEvent: Any + Send + Sync {
    /// 事件类型名
    fn event_type(&self) -> &str;

    /// 用于向下转型
    fn as_any(&self) -> &dyn Any;
}

/// 事件监听器
pub trait EventListener: Send + Sync {
    /// 是否处理该事件，默认处理所有事件
    fn supports(&self, _event: &dyn ApplicationEvent) -> bool {
        true
    }

    /// 处理事件
    fn on_event(&self, event: &dyn ApplicationEvent) -> anyhow::Result<()>;
}

/// 事件发布器
pub trait EventPublisher: Send + Sync {
    /// 同步发布事件
    ///
    /// 所有支持该事件的监听器都会被调用；任一监听器失败时返回第一个错误。
    fn publish_event(&self, event: &dyn ApplicationEvent) -> DependencyResult<()>;

    /// 添加监听器
    fn add_listener(&self, listener: Arc<dyn EventListener>);

    /// 移除监听器，按实例身份匹配
    fn remove_listener(&self, listener: &Arc<dyn EventListener>) -> bool;

    /// 移除所有监听器
    fn remove_all_listeners(&self);

    /// 监听器数量
    fn listener_count(&self) -> usize;
}
