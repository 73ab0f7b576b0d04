//! 事件发布实现

use di_abstractions::{ApplicationEvent, EventListener, EventPublisher};
use infrastructure_common::{DependencyError, DependencyResult};
use parking_lot::RwLock;
use std::any::Any;
use std::sync::Arc;
use tracing::{debug, warn};

/// 通用事件发布器
///
/// 监听器按添加顺序同步调用。
#[derive(Default)]
pub struct GenericEventPublisher {
    listeners: RwLock<Vec<Arc<dyn EventListener>>>,
}

impl GenericEventPublisher {
    /// 创建发布器
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventPublisher for GenericEventPublisher {
    fn publish_event(&self, event: &dyn ApplicationEvent) -> DependencyResult<()> {
        // 复制列表后再分发，监听器可以在回调中增删监听器
        let listeners: Vec<Arc<dyn EventListener>> = self.listeners.read().clone();
        debug!("发布事件: {} ({} 个监听器)", event.event_type(), listeners.len());

        let mut first_error = None;
        for listener in listeners.iter().filter(|l| l.supports(event)) {
            if let Err(e) = listener.on_event(event) {
                warn!("事件监听器处理 {} 失败: {}", event.event_type(), e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(DependencyError::EventDispatchFailed {
                event: event.event_type().to_string(),
                message: e.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn add_listener(&self, listener: Arc<dyn EventListener>) {
        self.listeners.write().push(listener);
    }

    fn remove_listener(&self, listener: &Arc<dyn EventListener>) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|l| !std::ptr::eq(Arc::as_ptr(l) as *const (), Arc::as_ptr(listener) as *const ()));
        listeners.len() != before
    }

    fn remove_all_listeners(&self) {
        self.listeners.write().clear();
    }

    fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }
}

impl std::fmt::Debug for GenericEventPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenericEventPublisher")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// 容器刷新完成事件
#[derive(Debug, Clone)]
pub struct ContextRefreshedEvent {
    /// 刷新后的组件数量
    pub component_count: usize,
}

impl ApplicationEvent for ContextRefreshedEvent {
    fn event_type(&self) -> &str {
        "ContextRefreshedEvent"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// 容器关闭事件
#[derive(Debug, Clone, Default)]
pub struct ContextClosedEvent;

impl ApplicationEvent for ContextClosedEvent {
    fn event_type(&self) -> &str {
        "ContextClosedEvent"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
