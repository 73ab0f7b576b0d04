//! 组件容器抽象接口
//!
//! [`ComponentContainer`] 是对象安全的查找接口，工厂与后处理器通过它递归解析依赖；
//! [`ComponentContainerExt`] 在其上提供按 Rust 类型取用组件的泛型方法。

use crate::conversion::ConversionService;
use crate::injection::InjectionPoint;
use crate::instance::{downcast_component, ComponentRef, Value};
use config_abstractions::{Environment, ResourceLoader};
use infrastructure_common::{DependencyError, DependencyResult, TypeInfo};
use std::sync::Arc;

/// 组件容器
pub trait ComponentContainer: Send + Sync {
    /// 是否存在指定名称的组件定义或单例
    fn contains_component(&self, name: &str) -> bool;

    /// 按名称获取组件实例，名称不存在时返回 `None`
    fn get_component(&self, name: &str) -> DependencyResult<Option<ComponentRef>>;

    /// 按名称获取并视为指定类型
    ///
    /// 名称不存在时返回 `None`；组件不能被视为该类型时返回 `TypeMismatch`。
    fn resolve_named(&self, name: &str, type_info: &TypeInfo) -> DependencyResult<Option<Value>>;

    /// 按类型获取唯一组件
    ///
    /// 没有候选时返回 `None`；多个候选时取唯一的首选组件，否则返回 `AmbiguousComponent`。
    fn resolve_by_type(&self, type_info: &TypeInfo) -> DependencyResult<Option<Value>>;

    /// 按类型获取所有组件，按注册顺序返回
    fn resolve_all(&self, type_info: &TypeInfo) -> DependencyResult<Vec<(String, Value)>>;

    /// 能被视为指定类型的组件名称
    ///
    /// `include_non_singletons` 为假时只返回单例；`allow_eager_init` 为真时同时创建这些单例。
    fn component_names_for_type(
        &self,
        type_info: &TypeInfo,
        include_non_singletons: bool,
        allow_eager_init: bool,
    ) -> DependencyResult<Vec<String>>;

    /// 组件的具体类型
    fn component_type(&self, name: &str) -> Option<TypeInfo>;

    /// 组件能否被视为指定类型
    fn is_type_match(&self, name: &str, type_info: &TypeInfo) -> bool;

    /// 解析注入点，非必需且无法解析时返回 `None`
    fn resolve_injection(
        &self,
        point: &InjectionPoint,
        requester: &str,
    ) -> DependencyResult<Option<Value>>;

    /// 当前属性环境
    fn environment(&self) -> Option<Arc<dyn Environment>>;

    /// 当前资源加载器
    fn resource_loader(&self) -> Option<Arc<dyn ResourceLoader>>;

    /// 容器持有的类型转换服务
    fn conversion_service(&self) -> Arc<dyn ConversionService>;
}

/// 按 Rust 类型取用组件
pub trait ComponentContainerExt {
    /// 按名称获取，`T` 可以是 `dyn Trait`
    fn get_bean<T: ?Sized + 'static>(&self, name: &str) -> DependencyResult<Option<Arc<T>>>;

    /// 按名称获取，不存在时返回 `NoSuchComponent`
    fn require_bean<T: ?Sized + 'static>(&self, name: &str) -> DependencyResult<Arc<T>>;

    /// 按类型获取唯一组件
    fn get_bean_of_type<T: ?Sized + 'static>(&self) -> DependencyResult<Option<Arc<T>>>;

    /// 按类型获取唯一组件，不存在时返回 `NoSuchComponent`
    fn require_bean_of_type<T: ?Sized + 'static>(&self) -> DependencyResult<Arc<T>>;

    /// 按类型获取所有组件
    fn get_beans_of_type<T: ?Sized + 'static>(&self) -> DependencyResult<Vec<(String, Arc<T>)>>;

    /// 能被视为 `T` 的组件名称
    fn get_bean_names_for_type<T: ?Sized + 'static>(
        &self,
        include_non_singletons: bool,
        allow_eager_init: bool,
    ) -> DependencyResult<Vec<String>>;
}

impl<C: ComponentContainer + ?Sized> ComponentContainerExt for C {
    fn get_bean<T: ?Sized + 'static>(&self, name: &str) -> DependencyResult<Option<Arc<T>>> {
        self.resolve_named(name, &TypeInfo::of::<T>())?
            .map(|value| downcast_component::<T>(value, name))
            .transpose()
    }

    fn require_bean<T: ?Sized + 'static>(&self, name: &str) -> DependencyResult<Arc<T>> {
        self.get_bean::<T>(name)?.ok_or_else(|| {
            DependencyError::no_such_component(format!(
                "{name} ({})",
                TypeInfo::of::<T>().short_name()
            ))
        })
    }

    fn get_bean_of_type<T: ?Sized + 'static>(&self) -> DependencyResult<Option<Arc<T>>> {
        let type_info = TypeInfo::of::<T>();
        self.resolve_by_type(&type_info)?
            .map(|value| downcast_component::<T>(value, type_info.short_name()))
            .transpose()
    }

    fn require_bean_of_type<T: ?Sized + 'static>(&self) -> DependencyResult<Arc<T>> {
        self.get_bean_of_type::<T>()?.ok_or_else(|| {
            DependencyError::no_such_component(format!("类型 {}", TypeInfo::of::<T>().short_name()))
        })
    }

    fn get_beans_of_type<T: ?Sized + 'static>(&self) -> DependencyResult<Vec<(String, Arc<T>)>> {
        self.resolve_all(&TypeInfo::of::<T>())?
            .into_iter()
            .map(|(name, value)| {
                let component = downcast_component::<T>(value, &name)?;
                Ok((name, component))
            })
            .collect()
    }

    fn get_bean_names_for_type<T: ?Sized + 'static>(
        &self,
        include_non_singletons: bool,
        allow_eager_init: bool,
    ) -> DependencyResult<Vec<String>> {
        self.component_names_for_type(&TypeInfo::of::<T>(), include_non_singletons, allow_eager_init)
    }
}
