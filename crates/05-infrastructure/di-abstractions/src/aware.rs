//! 能力感知与生命周期回调 trait
//!
//! 组件通过实现这些 trait 并在元数据中声明对应能力，
//! 由后处理器在初始化前注入容器句柄、属性环境等协作者。

use crate::container::ComponentContainer;
use config_abstractions::{Environment, ResourceLoader};
use std::any::Any;
use std::sync::{Arc, Weak};

/// 感知自身组件名称
pub trait NameAware {
    /// 设置组件名称
    fn set_component_name(&mut self, name: &str);
}

/// 感知所在容器
///
/// 容器持有组件，因此这里只提供弱引用。
pub trait ContainerAware {
    /// 设置容器句柄
    fn set_container(&mut self, container: Weak<dyn ComponentContainer>);
}

/// 感知属性环境
pub trait EnvironmentAware {
    /// 设置属性环境
    fn set_environment(&mut self, environment: Arc<dyn Environment>);
}

/// 感知资源加载器
pub trait ResourceLoaderAware {
    /// 设置资源加载器
    fn set_resource_loader(&mut self, loader: Arc<dyn ResourceLoader>);
}

/// 初始化回调，在所有前置处理之后、后置处理之前调用一次
pub trait InitializingComponent {
    /// 初始化组件
    fn initialize(&mut self) -> anyhow::Result<()>;
}

/// 销毁回调，在容器销毁单例时调用
pub trait DisposableComponent {
    /// 销毁组件
    fn destroy(&self) -> anyhow::Result<()>;
}

/// 名称注入函数
pub type NameAwareFn = fn(&mut (dyn Any + Send + Sync), &str);
/// 容器注入函数
pub type ContainerAwareFn = fn(&mut (dyn Any + Send + Sync), Weak<dyn ComponentContainer>);
/// 属性环境注入函数
pub type EnvironmentAwareFn = fn(&mut (dyn Any + Send + Sync), Arc<dyn Environment>);
/// 资源加载器注入函数
pub type ResourceLoaderAwareFn = fn(&mut (dyn Any + Send + Sync), Arc<dyn ResourceLoader>);
/// 初始化函数
pub type InitializeFn = fn(&mut (dyn Any + Send + Sync)) -> anyhow::Result<()>;
/// 销毁函数
pub type DestroyFn = fn(&(dyn Any + Send + Sync)) -> anyhow::Result<()>;

/// 组件类型声明的能力
///
/// 每一项都是对具体类型向下转型后调用 trait 方法的函数。
#[derive(Clone, Copy, Default)]
pub struct Capabilities {
    pub name_aware: Option<NameAwareFn>,
    pub container_aware: Option<ContainerAwareFn>,
    pub environment_aware: Option<EnvironmentAwareFn>,
    pub resource_loader_aware: Option<ResourceLoaderAwareFn>,
    pub initializing: Option<InitializeFn>,
    pub disposable: Option<DestroyFn>,
}

impl Capabilities {
    /// 是否声明了任意一种感知能力
    pub fn is_aware(&self) -> bool {
        self.name_aware.is_some()
            || self.container_aware.is_some()
            || self.environment_aware.is_some()
            || self.resource_loader_aware.is_some()
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities")
            .field("name_aware", &self.name_aware.is_some())
            .field("container_aware", &self.container_aware.is_some())
            .field("environment_aware", &self.environment_aware.is_some())
            .field("resource_loader_aware", &self.resource_loader_aware.is_some())
            .field("initializing", &self.initializing.is_some())
            .field("disposable", &self.disposable.is_some())
            .finish()
    }
}

pub(crate) fn apply_name<C: NameAware + Any>(instance: &mut (dyn Any + Send + Sync), name: &str) {
    if let Some(component) = instance.downcast_mut::<C>() {
        component.set_component_name(name);
    }
}

pub(crate) fn apply_container<C: ContainerAware + Any>(
    instance: &mut (dyn Any + Send + Sync),
    container: Weak<dyn ComponentContainer>,
) {
    if let Some(component) = instance.downcast_mut::<C>() {
        component.set_container(container);
    }
}

pub(crate) fn apply_environment<C: EnvironmentAware + Any>(
    instance: &mut (dyn Any + Send + Sync),
    environment: Arc<dyn Environment>,
) {
    if let Some(component) = instance.downcast_mut::<C>() {
        component.set_environment(environment);
    }
}

pub(crate) fn apply_resource_loader<C: ResourceLoaderAware + Any>(
    instance: &mut (dyn Any + Send + Sync),
    loader: Arc<dyn ResourceLoader>,
) {
    if let Some(component) = instance.downcast_mut::<C>() {
        component.set_resource_loader(loader);
    }
}

pub(crate) fn apply_initialize<C: InitializingComponent + Any>(
    instance: &mut (dyn Any + Send + Sync),
) -> anyhow::Result<()> {
    match instance.downcast_mut::<C>() {
        Some(component) => component.initialize(),
        None => Ok(()),
    }
}

pub(crate) fn apply_destroy<C: DisposableComponent + Any>(
    instance: &(dyn Any + Send + Sync),
) -> anyhow::Result<()> {
    match instance.downcast_ref::<C>() {
        Some(component) => component.destroy(),
        None => Ok(()),
    }
}
