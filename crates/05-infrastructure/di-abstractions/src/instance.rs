//! 组件实例表示

use infrastructure_common::{DependencyError, DependencyResult, TypeInfo};
use std::any::Any;
use std::sync::Arc;

/// 容器中缓存的组件实例
pub type ComponentRef = Arc<dyn Any + Send + Sync>;

/// 注入值：按类型取用的组件句柄 `Arc<T>`，或占位符转换后的值
pub type Value = Box<dyn Any + Send + Sync>;

/// 工厂产出的原始实例
///
/// 新建的实例为 `Owned`，可以在初始化前被后处理器修改；
/// 预先构建的实例为 `Shared`，只有在没有其他引用时才能修改。
pub enum RawInstance {
    /// 容器独占的新实例
    Owned(Box<dyn Any + Send + Sync>),
    /// 已共享的实例
    Shared(ComponentRef),
}

impl RawInstance {
    /// 包装新建的实例
    pub fn new<T: Any + Send + Sync>(instance: T) -> Self {
        Self::Owned(Box::new(instance))
    }

    /// 只读访问
    pub fn as_any(&self) -> &(dyn Any + Send + Sync) {
        match self {
            Self::Owned(boxed) => boxed.as_ref(),
            Self::Shared(shared) => shared.as_ref(),
        }
    }

    /// 可变访问，共享实例存在其他引用时返回 `None`
    pub fn as_any_mut(&mut self) -> Option<&mut (dyn Any + Send + Sync)> {
        match self {
            Self::Owned(boxed) => Some(boxed.as_mut()),
            Self::Shared(shared) => Arc::get_mut(shared),
        }
    }

    /// 按具体类型可变访问
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.as_any_mut()?.downcast_mut::<T>()
    }

    /// 转为可共享的组件实例
    pub fn into_shared(self) -> ComponentRef {
        match self {
            Self::Owned(boxed) => Arc::from(boxed),
            Self::Shared(shared) => shared,
        }
    }
}

impl std::fmt::Debug for RawInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Owned(_) => f.write_str("RawInstance::Owned(..)"),
            Self::Shared(_) => f.write_str("RawInstance::Shared(..)"),
        }
    }
}

/// 从注入值中取出 `Arc<T>`
pub fn downcast_component<T: ?Sized + 'static>(value: Value, name: &str) -> DependencyResult<Arc<T>> {
    value
        .downcast::<Arc<T>>()
        .map(|boxed| *boxed)
        .map_err(|_| type_mismatch::<Arc<T>>(name))
}

/// 从注入值中取出具体值
pub fn downcast_value<V: Any>(value: Value, name: &str) -> DependencyResult<V> {
    value
        .downcast::<V>()
        .map(|boxed| *boxed)
        .map_err(|_| type_mismatch::<V>(name))
}

fn type_mismatch<T: ?Sized + 'static>(name: &str) -> DependencyError {
    DependencyError::TypeMismatch {
        name: name.to_string(),
        expected: TypeInfo::of::<T>().module_path.to_string(),
        actual: "未知类型".to_string(),
    }
}
