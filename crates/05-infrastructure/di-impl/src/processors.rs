//! 内置组件后处理器
//!
//! 初始化前：字段注入，然后按能力注入名称、容器、属性环境与资源加载器。
//! 初始化后：把转换器形态的组件登记到转换服务，把监听器形态的组件登记到事件发布器。

use di_abstractions::{
    downcast_component, ComponentContainer, ComponentDefinition, ComponentPostProcessor,
    ComponentRef, EventListener, EventPublisher, RawInstance, TypeConverter,
};
use infrastructure_common::{DependencyResult, TypeInfo};
use std::any::Any;
use std::sync::{Arc, Weak};
use tracing::debug;

/// 字段注入处理器优先级
pub const AUTOWIRED_PRIORITY: i32 = 0;
/// 名称注入处理器优先级
pub const NAME_AWARE_PRIORITY: i32 = 10;
/// 容器注入处理器优先级
pub const CONTAINER_AWARE_PRIORITY: i32 = 20;
/// 属性环境注入处理器优先级
pub const ENVIRONMENT_AWARE_PRIORITY: i32 = 30;
/// 资源加载器注入处理器优先级
pub const RESOURCE_LOADER_AWARE_PRIORITY: i32 = 40;
/// 转换器登记处理器优先级
pub const CONVERTER_DETECTOR_PRIORITY: i32 = 100;
/// 监听器登记处理器优先级
pub const LISTENER_DETECTOR_PRIORITY: i32 = 110;

/// 取得可修改的实例；共享实例存在其他引用时跳过
fn mutable_instance<'a>(
    processor: &str,
    definition: &ComponentDefinition,
    instance: &'a mut RawInstance,
) -> Option<&'a mut (dyn Any + Send + Sync)> {
    let mutable = instance.as_any_mut();
    if mutable.is_none() {
        debug!(
            "{}: 组件 {} 为共享实例，跳过",
            processor,
            definition.name()
        );
    }
    mutable
}

/// 字段注入
///
/// 按元数据声明的字段注入点解析依赖并写入实例。
#[derive(Debug, Default)]
pub struct AutowiredProcessor;

impl ComponentPostProcessor for AutowiredProcessor {
    fn name(&self) -> &str {
        "AutowiredProcessor"
    }

    fn priority(&self) -> Option<i32> {
        Some(AUTOWIRED_PRIORITY)
    }

    fn before_initialization(
        &self,
        definition: &ComponentDefinition,
        instance: &mut RawInstance,
        container: &dyn ComponentContainer,
    ) -> DependencyResult<()> {
        let injectors = definition.metadata().injectors();
        if injectors.is_empty() {
            return Ok(());
        }
        let Some(target) = mutable_instance(self.name(), definition, instance) else {
            return Ok(());
        };

        for injector in injectors {
            if let Some(value) = container.resolve_injection(injector.point(), definition.name())? {
                debug!("注入字段: {}.{}", definition.name(), injector.field());
                injector.inject(target, value)?;
            }
        }
        Ok(())
    }
}

/// 注入组件名称
#[derive(Debug, Default)]
pub struct NameAwareProcessor;

impl ComponentPostProcessor for NameAwareProcessor {
    fn name(&self) -> &str {
        "NameAwareProcessor"
    }

    fn priority(&self) -> Option<i32> {
        Some(NAME_AWARE_PRIORITY)
    }

    fn before_initialization(
        &self,
        definition: &ComponentDefinition,
        instance: &mut RawInstance,
        _container: &dyn ComponentContainer,
    ) -> DependencyResult<()> {
        if let Some(apply) = definition.metadata().capabilities().name_aware {
            if let Some(target) = mutable_instance(self.name(), definition, instance) {
                apply(target, definition.name());
            }
        }
        Ok(())
    }
}

/// 注入容器句柄
///
/// 容器持有组件，组件只拿到弱引用。
pub struct ContainerAwareProcessor {
    container: Weak<dyn ComponentContainer>,
}

impl ContainerAwareProcessor {
    /// 创建处理器
    pub fn new(container: Weak<dyn ComponentContainer>) -> Self {
        Self { container }
    }
}

impl ComponentPostProcessor for ContainerAwareProcessor {
    fn name(&self) -> &str {
        "ContainerAwareProcessor"
    }

    fn priority(&self) -> Option<i32> {
        Some(CONTAINER_AWARE_PRIORITY)
    }

    fn before_initialization(
        &self,
        definition: &ComponentDefinition,
        instance: &mut RawInstance,
        _container: &dyn ComponentContainer,
    ) -> DependencyResult<()> {
        if let Some(apply) = definition.metadata().capabilities().container_aware {
            if let Some(target) = mutable_instance(self.name(), definition, instance) {
                apply(target, self.container.clone());
            }
        }
        Ok(())
    }
}

/// 注入属性环境
#[derive(Debug, Default)]
pub struct EnvironmentAwareProcessor;

impl ComponentPostProcessor for EnvironmentAwareProcessor {
    fn name(&self) -> &str {
        "EnvironmentAwareProcessor"
    }

    fn priority(&self) -> Option<i32> {
        Some(ENVIRONMENT_AWARE_PRIORITY)
    }

    fn before_initialization(
        &self,
        definition: &ComponentDefinition,
        instance: &mut RawInstance,
        container: &dyn ComponentContainer,
    ) -> DependencyResult<()> {
        let Some(apply) = definition.metadata().capabilities().environment_aware else {
            return Ok(());
        };
        let Some(environment) = container.environment() else {
            debug!("未设置属性环境，组件 {} 不注入", definition.name());
            return Ok(());
        };
        if let Some(target) = mutable_instance(self.name(), definition, instance) {
            apply(target, environment);
        }
        Ok(())
    }
}

/// 注入资源加载器
#[derive(Debug, Default)]
pub struct ResourceLoaderAwareProcessor;

impl ComponentPostProcessor for ResourceLoaderAwareProcessor {
    fn name(&self) -> &str {
        "ResourceLoaderAwareProcessor"
    }

    fn priority(&self) -> Option<i32> {
        Some(RESOURCE_LOADER_AWARE_PRIORITY)
    }

    fn before_initialization(
        &self,
        definition: &ComponentDefinition,
        instance: &mut RawInstance,
        container: &dyn ComponentContainer,
    ) -> DependencyResult<()> {
        let Some(apply) = definition.metadata().capabilities().resource_loader_aware else {
            return Ok(());
        };
        let Some(loader) = container.resource_loader() else {
            debug!("未设置资源加载器，组件 {} 不注入", definition.name());
            return Ok(());
        };
        if let Some(target) = mutable_instance(self.name(), definition, instance) {
            apply(target, loader);
        }
        Ok(())
    }
}

/// 单例取用为 `Arc<T>`，组件未声明为 `T` 时返回 `None`
fn singleton_view<T: ?Sized + 'static>(
    definition: &ComponentDefinition,
    instance: &ComponentRef,
) -> DependencyResult<Option<Arc<T>>> {
    if !definition.is_singleton() {
        return Ok(None);
    }
    let Some(binding) = definition.metadata().binding_for(&TypeInfo::of::<T>()) else {
        return Ok(None);
    };
    binding
        .cast(instance.clone())
        .map(|value| downcast_component::<T>(value, definition.name()))
        .transpose()
}

/// 把转换器形态的单例登记到容器的转换服务
#[derive(Debug, Default)]
pub struct ConverterDetector;

impl ComponentPostProcessor for ConverterDetector {
    fn name(&self) -> &str {
        "ConverterDetector"
    }

    fn priority(&self) -> Option<i32> {
        Some(CONVERTER_DETECTOR_PRIORITY)
    }

    fn after_initialization(
        &self,
        definition: &ComponentDefinition,
        instance: ComponentRef,
        container: &dyn ComponentContainer,
    ) -> DependencyResult<ComponentRef> {
        if let Some(converter) = singleton_view::<dyn TypeConverter>(definition, &instance)? {
            debug!("登记类型转换器: {}", definition.name());
            container.conversion_service().register(converter);
        }
        Ok(instance)
    }
}

/// 把监听器形态的单例登记到事件发布器
pub struct ListenerDetector {
    publisher: Arc<dyn EventPublisher>,
}

impl ListenerDetector {
    /// 创建处理器
    pub fn new(publisher: Arc<dyn EventPublisher>) -> Self {
        Self { publisher }
    }
}

impl ComponentPostProcessor for ListenerDetector {
    fn name(&self) -> &str {
        "ListenerDetector"
    }

    fn priority(&self) -> Option<i32> {
        Some(LISTENER_DETECTOR_PRIORITY)
    }

    fn after_initialization(
        &self,
        definition: &ComponentDefinition,
        instance: ComponentRef,
        _container: &dyn ComponentContainer,
    ) -> DependencyResult<ComponentRef> {
        if let Some(listener) = singleton_view::<dyn EventListener>(definition, &instance)? {
            debug!("登记事件监听器: {}", definition.name());
            self.publisher.add_listener(listener);
        }
        Ok(instance)
    }
}
