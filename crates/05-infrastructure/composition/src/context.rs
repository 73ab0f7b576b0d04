//! 应用上下文
//!
//! 把注册表、组件容器、属性环境与事件发布器组合在一起，
//! 通过 `refresh` 完成配置解析与单例预实例化。

use crate::builder::ApplicationContextBuilder;
use config_abstractions::{Environment, ResourceLoader};
use config_impl::StandardEnvironment;
use di_abstractions::{
    order_by_priority, ApplicationEvent, ComponentContainer, ComponentContainerExt,
    ComponentDefinition, ComponentPostProcessor, ComponentRef, ConversionService,
    DefinitionRegistry, EventPublisher, InjectionPoint, RegistryPostProcessor, TypeMetadataTable,
    Value,
};
use di_impl::{
    AutowiredProcessor, ConfigurationProcessor, ContainerAwareProcessor, ContextClosedEvent,
    ContextRefreshedEvent, ConverterDetector, EnvironmentAwareProcessor, GenericComponentContainer,
    GenericEventPublisher, ListenerDetector, NameAwareProcessor, ResourceLoaderAwareProcessor,
};
use infrastructure_common::{ContextState, DependencyError, DependencyResult, TypeInfo};
use parking_lot::Mutex;
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, error, info};

/// 内置共享组件名称
pub const ENVIRONMENT_COMPONENT_NAME: &str = "environment";
/// 内置共享组件名称
pub const CONVERSION_SERVICE_COMPONENT_NAME: &str = "conversionService";
/// 内置共享组件名称
pub const EVENT_PUBLISHER_COMPONENT_NAME: &str = "eventPublisher";
/// 内置共享组件名称
pub const RESOURCE_LOADER_COMPONENT_NAME: &str = "resourceLoader";

/// 应用上下文
///
/// 状态流转为 `Built -> Prepared -> Resolving -> Populating -> Ready`。
/// 解析或实例化阶段出错时进入 `Failed`，已创建的单例全部销毁后原样返回错误。
/// 每个上下文只能刷新一次。
///
/// 刷新与关闭事件在生命周期锁之外发布，监听器可以在回调中关闭上下文。
pub struct ApplicationContext {
    container: Arc<GenericComponentContainer>,
    publisher: Arc<GenericEventPublisher>,
    environment: Arc<StandardEnvironment>,
    resource_loader: Option<Arc<dyn ResourceLoader>>,
    metadata_table: Arc<TypeMetadataTable>,
    registry_processors: Mutex<Vec<Arc<dyn RegistryPostProcessor>>>,
    state: Mutex<ContextState>,
    lifecycle: Mutex<()>,
    closing: AtomicBool,
}

impl ApplicationContext {
    /// 创建上下文构建器
    pub fn builder() -> ApplicationContextBuilder {
        ApplicationContextBuilder::new()
    }

    pub(crate) fn new(
        container: Arc<GenericComponentContainer>,
        environment: Arc<StandardEnvironment>,
        resource_loader: Option<Arc<dyn ResourceLoader>>,
        metadata_table: Arc<TypeMetadataTable>,
        registry_processors: Vec<Arc<dyn RegistryPostProcessor>>,
    ) -> Self {
        Self {
            container,
            publisher: Arc::new(GenericEventPublisher::new()),
            environment,
            resource_loader,
            metadata_table,
            registry_processors: Mutex::new(registry_processors),
            state: Mutex::new(ContextState::Built),
            lifecycle: Mutex::new(()),
            closing: AtomicBool::new(false),
        }
    }

    /// 当前状态
    pub fn state(&self) -> ContextState {
        *self.state.lock()
    }

    /// 是否已刷新完成且未关闭
    pub fn is_active(&self) -> bool {
        self.state() == ContextState::Ready
    }

    /// 底层组件容器
    pub fn container(&self) -> &Arc<GenericComponentContainer> {
        &self.container
    }

    /// 属性环境
    pub fn standard_environment(&self) -> &Arc<StandardEnvironment> {
        &self.environment
    }

    /// 事件发布器
    pub fn event_publisher(&self) -> Arc<dyn EventPublisher> {
        self.publisher.clone()
    }

    /// 类型元数据表
    pub fn metadata_table(&self) -> &Arc<TypeMetadataTable> {
        &self.metadata_table
    }

    /// 定义注册表
    pub fn registry(&self) -> &dyn DefinitionRegistry {
        self.container.registry()
    }

    /// 注册组件定义
    pub fn register_definition(&self, definition: ComponentDefinition) -> DependencyResult<()> {
        self.ensure_open()?;
        self.container.register_definition(definition)
    }

    /// 注册预先构建的单例
    pub fn register_singleton<T: Any + Send + Sync>(
        &self,
        name: impl Into<String>,
        instance: Arc<T>,
    ) -> DependencyResult<()> {
        self.ensure_open()?;
        self.container.register_singleton(name, instance)
    }

    /// 添加组件后处理器
    pub fn add_post_processor(&self, processor: Arc<dyn ComponentPostProcessor>) {
        self.container.add_post_processor(processor);
    }

    /// 添加注册表后处理器，在刷新的解析阶段执行
    pub fn add_registry_processor(&self, processor: Arc<dyn RegistryPostProcessor>) {
        self.registry_processors.lock().push(processor);
    }

    /// 发布事件
    pub fn publish_event(&self, event: &dyn ApplicationEvent) -> DependencyResult<()> {
        self.publisher.publish_event(event)
    }

    /// 刷新上下文
    ///
    /// 只能在 `Built` 状态调用一次，其余状态返回 `IllegalState`。
    pub fn refresh(&self) -> DependencyResult<()> {
        let component_count = {
            let _lifecycle = self.lifecycle.lock();
            let state = self.state();
            if state != ContextState::Built || self.closing.load(Ordering::SeqCst) {
                return Err(DependencyError::illegal_state(format!(
                    "上下文当前状态为 {state}，只能在 Built 状态刷新一次"
                )));
            }

            info!("开始刷新应用上下文");
            let count = self
                .prepare()
                .and_then(|()| self.resolve_configuration())
                .and_then(|()| self.populate());
            match count {
                Ok(count) => {
                    self.transition(ContextState::Ready);
                    count
                }
                Err(e) => return Err(self.fail(e)),
            }
        };

        if let Err(e) = self
            .publisher
            .publish_event(&ContextRefreshedEvent { component_count })
        {
            let _lifecycle = self.lifecycle.lock();
            // 监听器可能已经关闭了上下文
            if self.state() == ContextState::Ready {
                return Err(self.fail(e));
            }
            return Err(e);
        }

        info!("应用上下文刷新完成，共 {} 个组件定义", component_count);
        Ok(())
    }

    /// 关闭上下文
    ///
    /// 发布关闭事件，按创建逆序销毁单例并清空注册表。重复关闭不做任何事。
    pub fn close(&self) -> DependencyResult<()> {
        if self.closing.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        info!("关闭应用上下文");
        let published = if self.state() == ContextState::Ready {
            self.publisher.publish_event(&ContextClosedEvent)
        } else {
            Ok(())
        };

        let _lifecycle = self.lifecycle.lock();
        self.container.destroy_singletons();
        self.publisher.remove_all_listeners();
        self.container.registry().clear();
        self.transition(ContextState::Closed);
        published
    }

    fn fail(&self, e: DependencyError) -> DependencyError {
        error!("应用上下文刷新失败: {}", e);
        self.transition(ContextState::Failed);
        self.container.destroy_singletons();
        e
    }

    fn transition(&self, next: ContextState) {
        let mut state = self.state.lock();
        debug!("上下文状态: {} -> {}", *state, next);
        *state = next;
    }

    fn ensure_open(&self) -> DependencyResult<()> {
        match self.state() {
            ContextState::Closed | ContextState::Failed => Err(DependencyError::illegal_state(
                format!("上下文已处于 {} 状态", self.state()),
            )),
            _ => Ok(()),
        }
    }

    /// 挂载内置后处理器与协作者
    fn prepare(&self) -> DependencyResult<()> {
        let environment: Arc<dyn Environment> = self.environment.clone();
        self.container.set_environment(environment.clone());
        if let Some(loader) = &self.resource_loader {
            self.container.set_resource_loader(loader.clone());
        }

        let container = Arc::downgrade(&self.container);
        let container: Weak<dyn ComponentContainer> = container;
        let publisher: Arc<dyn EventPublisher> = self.publisher.clone();
        let processors: Vec<Arc<dyn ComponentPostProcessor>> = vec![
            Arc::new(AutowiredProcessor),
            Arc::new(NameAwareProcessor),
            Arc::new(ContainerAwareProcessor::new(container)),
            Arc::new(EnvironmentAwareProcessor),
            Arc::new(ResourceLoaderAwareProcessor),
            Arc::new(ConverterDetector),
            Arc::new(ListenerDetector::new(publisher.clone())),
        ];
        for processor in processors {
            self.container.add_post_processor(processor);
        }

        self.container
            .register_shared::<dyn Environment>(ENVIRONMENT_COMPONENT_NAME, environment)?;
        self.container.register_shared::<dyn ConversionService>(
            CONVERSION_SERVICE_COMPONENT_NAME,
            self.container.conversion_service(),
        )?;
        self.container
            .register_shared::<dyn EventPublisher>(EVENT_PUBLISHER_COMPONENT_NAME, publisher)?;
        if let Some(loader) = &self.resource_loader {
            self.container
                .register_shared::<dyn ResourceLoader>(RESOURCE_LOADER_COMPONENT_NAME, loader.clone())?;
        }

        self.transition(ContextState::Prepared);
        Ok(())
    }

    /// 展开配置模块并执行注册表后处理器
    fn resolve_configuration(&self) -> DependencyResult<()> {
        self.transition(ContextState::Resolving);
        let registry = self.container.registry();

        let configuration = Arc::new(ConfigurationProcessor::new(
            self.resource_loader.clone(),
            self.metadata_table.clone(),
        ));
        let mut processors: Vec<Arc<dyn RegistryPostProcessor>> = vec![configuration.clone()];
        processors.extend(self.registry_processors.lock().iter().cloned());
        order_by_priority(&mut processors, |p| p.priority());
        run_registry_processors(&processors, registry)?;

        // 配置模块也可以贡献注册表后处理器组件
        let mut contributed: Vec<Arc<dyn RegistryPostProcessor>> = self
            .container
            .get_beans_of_type::<dyn RegistryPostProcessor>()?
            .into_iter()
            .map(|(_, processor)| processor)
            .collect();
        if !contributed.is_empty() {
            order_by_priority(&mut contributed, |p| p.priority());
            run_registry_processors(&contributed, registry)?;
            // 后处理器新注册的配置模块
            configuration.post_process_registry(registry)?;
        }
        Ok(())
    }

    /// 挂载组件后处理器并实例化非延迟单例
    fn populate(&self) -> DependencyResult<usize> {
        self.transition(ContextState::Populating);

        for (name, processor) in self
            .container
            .get_beans_of_type::<dyn ComponentPostProcessor>()?
        {
            debug!("挂载组件后处理器: {}", name);
            self.container.add_post_processor(processor);
        }

        self.container.pre_instantiate_singletons()?;
        Ok(self.container.registry().definition_count())
    }
}

fn run_registry_processors(
    processors: &[Arc<dyn RegistryPostProcessor>],
    registry: &dyn DefinitionRegistry,
) -> DependencyResult<()> {
    for processor in processors {
        debug!("执行注册表后处理器: {}", processor.name());
        processor.post_process_registry(registry)?;
    }
    Ok(())
}

impl ComponentContainer for ApplicationContext {
    fn contains_component(&self, name: &str) -> bool {
        self.container.contains_component(name)
    }

    fn get_component(&self, name: &str) -> DependencyResult<Option<ComponentRef>> {
        self.ensure_open()?;
        self.container.get_component(name)
    }

    fn resolve_named(&self, name: &str, type_info: &TypeInfo) -> DependencyResult<Option<Value>> {
        self.ensure_open()?;
        self.container.resolve_named(name, type_info)
    }

    fn resolve_by_type(&self, type_info: &TypeInfo) -> DependencyResult<Option<Value>> {
        self.ensure_open()?;
        self.container.resolve_by_type(type_info)
    }

    fn resolve_all(&self, type_info: &TypeInfo) -> DependencyResult<Vec<(String, Value)>> {
        self.ensure_open()?;
        self.container.resolve_all(type_info)
    }

    fn component_names_for_type(
        &self,
        type_info: &TypeInfo,
        include_non_singletons: bool,
        allow_eager_init: bool,
    ) -> DependencyResult<Vec<String>> {
        self.ensure_open()?;
        self.container
            .component_names_for_type(type_info, include_non_singletons, allow_eager_init)
    }

    fn component_type(&self, name: &str) -> Option<TypeInfo> {
        self.container.component_type(name)
    }

    fn is_type_match(&self, name: &str, type_info: &TypeInfo) -> bool {
        self.container.is_type_match(name, type_info)
    }

    fn resolve_injection(
        &self,
        point: &InjectionPoint,
        requester: &str,
    ) -> DependencyResult<Option<Value>> {
        self.ensure_open()?;
        self.container.resolve_injection(point, requester)
    }

    fn environment(&self) -> Option<Arc<dyn Environment>> {
        self.container.environment()
    }

    fn resource_loader(&self) -> Option<Arc<dyn ResourceLoader>> {
        self.container.resource_loader()
    }

    fn conversion_service(&self) -> Arc<dyn ConversionService> {
        self.container.conversion_service()
    }
}

impl std::fmt::Debug for ApplicationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationContext")
            .field("state", &self.state())
            .field("container", &self.container)
            .field("environment", &self.environment)
            .finish()
    }
}
