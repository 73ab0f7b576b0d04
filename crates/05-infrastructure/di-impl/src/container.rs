//! 组件容器实现
//!
//! 单例创建在一把可重入锁下串行进行：同一线程的递归创建可以重入，
//! 不同线程对同一单例的请求会等待先到者完成，因此每个单例最多构造一次。
//! 锁内保存的创建链用于检测循环创建。

use crate::registry::GenericDefinitionRegistry;
use config_abstractions::{replace_placeholders, Environment, ResourceLoader};
use di_abstractions::{
    into_dependency_error, order_by_priority, ComponentContainer, ComponentDefinition,
    ComponentPostProcessor, ComponentRef, ComponentType, ConversionService, DefinitionRegistry,
    InjectionPoint, InjectionTarget, RawInstance, Value,
};
use infrastructure_common::{DependencyError, DependencyResult, TypeInfo};
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 通用组件容器
pub struct GenericComponentContainer {
    registry: GenericDefinitionRegistry,
    singletons: RwLock<HashMap<String, ComponentRef>>,
    creation_order: Mutex<Vec<String>>,
    creation_lock: ReentrantMutex<RefCell<Vec<String>>>,
    post_processors: RwLock<Vec<Arc<dyn ComponentPostProcessor>>>,
    environment: RwLock<Option<Arc<dyn Environment>>>,
    resource_loader: RwLock<Option<Arc<dyn ResourceLoader>>>,
    conversion_service: Arc<dyn ConversionService>,
}

/// 离开作用域时把名称移出创建链
struct InCreation<'a> {
    chain: &'a RefCell<Vec<String>>,
}

impl Drop for InCreation<'_> {
    fn drop(&mut self) {
        self.chain.borrow_mut().pop();
    }
}

impl GenericComponentContainer {
    /// 使用给定的转换服务创建容器
    pub fn new(conversion_service: Arc<dyn ConversionService>) -> Self {
        Self {
            registry: GenericDefinitionRegistry::new(),
            singletons: RwLock::new(HashMap::new()),
            creation_order: Mutex::new(Vec::new()),
            creation_lock: ReentrantMutex::new(RefCell::new(Vec::new())),
            post_processors: RwLock::new(Vec::new()),
            environment: RwLock::new(None),
            resource_loader: RwLock::new(None),
            conversion_service,
        }
    }

    /// 定义注册表
    pub fn registry(&self) -> &dyn DefinitionRegistry {
        &self.registry
    }

    /// 注册组件定义
    pub fn register_definition(&self, definition: ComponentDefinition) -> DependencyResult<()> {
        self.registry.register_definition(definition)
    }

    /// 注册预先构建的单例，元数据只包含具体类型
    pub fn register_singleton<T: Any + Send + Sync>(
        &self,
        name: impl Into<String>,
        instance: Arc<T>,
    ) -> DependencyResult<()> {
        self.register_singleton_with(name, instance, Arc::new(ComponentType::of::<T>()))
    }

    /// 以 `Arc<I>` 句柄注册单例，按 `I` 查找，`I` 通常是 `dyn Trait`
    pub fn register_shared<I>(&self, name: impl Into<String>, handle: Arc<I>) -> DependencyResult<()>
    where
        I: ?Sized + Send + Sync + 'static,
    {
        self.register_singleton_with(name, Arc::new(handle), Arc::new(ComponentType::shared::<I>()))
    }

    /// 注册预先构建的单例，使用给定的元数据
    ///
    /// 实例直接进入单例缓存，不经过后处理器。
    pub fn register_singleton_with(
        &self,
        name: impl Into<String>,
        instance: ComponentRef,
        metadata: Arc<ComponentType>,
    ) -> DependencyResult<()> {
        let name = name.into();
        let _guard = self.creation_lock.lock();
        self.registry.register_definition(ComponentDefinition::for_instance(
            name.clone(),
            instance.clone(),
            metadata,
        ))?;
        self.singletons.write().insert(name.clone(), instance);
        self.creation_order.lock().push(name.clone());
        debug!("注册单例实例: {}", name);
        Ok(())
    }

    /// 添加后处理器并按优先级重新排序
    pub fn add_post_processor(&self, processor: Arc<dyn ComponentPostProcessor>) {
        let mut processors = self.post_processors.write();
        debug!("添加组件后处理器: {}", processor.name());
        processors.push(processor);
        order_by_priority(&mut processors, |p| p.priority());
    }

    /// 当前后处理器，按执行顺序
    pub fn post_processors(&self) -> Vec<Arc<dyn ComponentPostProcessor>> {
        self.post_processors.read().clone()
    }

    /// 设置属性环境
    pub fn set_environment(&self, environment: Arc<dyn Environment>) {
        *self.environment.write() = Some(environment);
    }

    /// 设置资源加载器
    pub fn set_resource_loader(&self, loader: Arc<dyn ResourceLoader>) {
        *self.resource_loader.write() = Some(loader);
    }

    /// 是否已创建指定单例
    pub fn contains_singleton(&self, name: &str) -> bool {
        self.singletons.read().contains_key(name)
    }

    /// 已创建的单例数量
    pub fn singleton_count(&self) -> usize {
        self.singletons.read().len()
    }

    /// 已创建的单例名称，按创建顺序
    pub fn singleton_names(&self) -> Vec<String> {
        self.creation_order.lock().clone()
    }

    /// 获取或创建组件
    ///
    /// 原型组件每次新建；单例组件先查缓存，再在创建锁下创建。
    pub fn get_or_create(&self, definition: &ComponentDefinition) -> DependencyResult<ComponentRef> {
        if !definition.is_singleton() {
            return self.create_component(definition);
        }

        let name = definition.name();
        let cached = self.singletons.read().get(name).cloned();
        if let Some(instance) = cached {
            return Ok(instance);
        }

        let guard = self.creation_lock.lock();
        let cached = self.singletons.read().get(name).cloned();
        if let Some(instance) = cached {
            return Ok(instance);
        }

        {
            let mut chain = guard.borrow_mut();
            if chain.iter().any(|n| n == name) {
                let mut cycle = chain.clone();
                cycle.push(name.to_string());
                return Err(DependencyError::CircularCreation {
                    name: name.to_string(),
                    chain: cycle.join(" -> "),
                });
            }
            chain.push(name.to_string());
        }
        let _in_creation = InCreation { chain: &guard };

        debug!("创建单例组件: {}", name);
        let instance = self.create_component(definition)?;
        self.singletons
            .write()
            .insert(name.to_string(), instance.clone());
        self.creation_order.lock().push(name.to_string());
        Ok(instance)
    }

    /// 实例化所有非延迟单例，按注册顺序
    pub fn pre_instantiate_singletons(&self) -> DependencyResult<usize> {
        let eager = self
            .registry
            .definitions_matching(&|d: &ComponentDefinition| d.is_singleton() && !d.is_lazy());
        for definition in &eager {
            self.get_or_create(definition)?;
        }
        info!("预实例化单例完成，共 {} 个", eager.len());
        Ok(eager.len())
    }

    /// 按创建的逆序销毁所有单例
    ///
    /// 销毁回调的错误只记录日志，不会中断其余组件的销毁。
    pub fn destroy_singletons(&self) {
        let _guard = self.creation_lock.lock();
        let order = std::mem::take(&mut *self.creation_order.lock());
        info!("销毁单例组件，共 {} 个", order.len());

        for name in order.iter().rev() {
            let instance = self.singletons.write().remove(name);
            if let Some(instance) = instance {
                self.dispose(name, &instance);
            }
        }
        self.singletons.write().clear();
    }

    /// 销毁单个单例
    pub fn destroy_singleton(&self, name: &str) -> bool {
        let _guard = self.creation_lock.lock();
        let instance = self.singletons.write().remove(name);
        self.creation_order.lock().retain(|n| n != name);
        match instance {
            Some(instance) => {
                self.dispose(name, &instance);
                true
            }
            None => false,
        }
    }

    fn dispose(&self, name: &str, instance: &ComponentRef) {
        let Some(definition) = self.registry.get_definition(name) else {
            return;
        };
        if let Some(destroy) = definition.metadata().capabilities().disposable {
            debug!("调用销毁回调: {}", name);
            if let Err(e) = destroy(&**instance) {
                warn!("组件 {} 销毁失败: {}", name, e);
            }
        }
    }

    fn create_component(&self, definition: &ComponentDefinition) -> DependencyResult<ComponentRef> {
        for dependency in definition.depends_on() {
            if !self.contains_component(dependency) {
                return Err(DependencyError::no_such_component(format!(
                    "{} 声明依赖的组件 {}",
                    definition.name(),
                    dependency
                )));
            }
            self.get_component(dependency)?;
        }

        let raw = definition.factory().build(self)?;
        self.initialize_component(definition, raw)
    }

    fn initialize_component(
        &self,
        definition: &ComponentDefinition,
        mut raw: RawInstance,
    ) -> DependencyResult<ComponentRef> {
        let processors = self.post_processors();
        for processor in &processors {
            processor.before_initialization(definition, &mut raw, self)?;
        }

        if let Some(initialize) = definition.metadata().capabilities().initializing {
            match raw.as_any_mut() {
                Some(instance) => {
                    debug!("调用初始化回调: {}", definition.name());
                    initialize(instance).map_err(|e| into_dependency_error(e, definition.name()))?;
                }
                None => debug!("组件 {} 为共享实例，跳过初始化回调", definition.name()),
            }
        }

        let mut instance = raw.into_shared();
        for processor in &processors {
            instance = processor.after_initialization(definition, instance, self)?;
        }
        Ok(instance)
    }

    fn candidates_for(&self, type_info: &TypeInfo) -> Vec<Arc<ComponentDefinition>> {
        self.registry
            .definitions_matching(&|d: &ComponentDefinition| d.matches_type(type_info))
    }

    fn instance_as(&self, definition: &ComponentDefinition, type_info: &TypeInfo) -> DependencyResult<Value> {
        let binding = definition
            .metadata()
            .binding_for(type_info)
            .ok_or_else(|| type_mismatch(definition, type_info))?;
        let instance = self.get_or_create(definition)?;
        binding
            .cast(instance)
            .ok_or_else(|| type_mismatch(definition, type_info))
    }

    fn resolve_placeholder(
        &self,
        expression: &str,
        target: &TypeInfo,
        required: bool,
        requester: &str,
    ) -> DependencyResult<Option<Value>> {
        let resolved = match self.environment() {
            Some(environment) if required => environment.resolve_required_placeholders(expression),
            Some(environment) => Ok(environment.resolve_placeholders(expression)),
            None => replace_placeholders(expression, |_| None, required),
        };
        let text = resolved.map_err(|e| {
            DependencyError::no_such_component(format!("{requester} 需要的属性值 ({e})"))
        })?;

        if !required && text.is_empty() && !target.is::<String>() {
            return Ok(None);
        }

        let value = self
            .conversion_service
            .convert_value(Box::new(text), TypeInfo::of::<String>(), target)?;
        Ok(Some(value))
    }
}

fn type_mismatch(definition: &ComponentDefinition, type_info: &TypeInfo) -> DependencyError {
    DependencyError::TypeMismatch {
        name: definition.name().to_string(),
        expected: type_info.module_path.to_string(),
        actual: definition.type_info().module_path.to_string(),
    }
}

impl ComponentContainer for GenericComponentContainer {
    fn contains_component(&self, name: &str) -> bool {
        self.registry.contains_definition(name) || self.singletons.read().contains_key(name)
    }

    fn get_component(&self, name: &str) -> DependencyResult<Option<ComponentRef>> {
        match self.registry.get_definition(name) {
            Some(definition) => self.get_or_create(&definition).map(Some),
            None => Ok(self.singletons.read().get(name).cloned()),
        }
    }

    fn resolve_named(&self, name: &str, type_info: &TypeInfo) -> DependencyResult<Option<Value>> {
        match self.registry.get_definition(name) {
            Some(definition) => self.instance_as(&definition, type_info).map(Some),
            None => Ok(None),
        }
    }

    fn resolve_by_type(&self, type_info: &TypeInfo) -> DependencyResult<Option<Value>> {
        let candidates = self.candidates_for(type_info);
        let chosen = match candidates.len() {
            0 => return Ok(None),
            1 => &candidates[0],
            _ => {
                let primaries: Vec<&Arc<ComponentDefinition>> =
                    candidates.iter().filter(|d| d.is_primary()).collect();
                if primaries.len() != 1 {
                    return Err(DependencyError::AmbiguousComponent {
                        type_name: type_info.short_name().to_string(),
                        candidates: candidates.iter().map(|d| d.name().to_string()).collect(),
                    });
                }
                primaries[0]
            }
        };
        self.instance_as(chosen, type_info).map(Some)
    }

    fn resolve_all(&self, type_info: &TypeInfo) -> DependencyResult<Vec<(String, Value)>> {
        self.candidates_for(type_info)
            .iter()
            .map(|definition| {
                let value = self.instance_as(definition, type_info)?;
                Ok((definition.name().to_string(), value))
            })
            .collect()
    }

    fn component_names_for_type(
        &self,
        type_info: &TypeInfo,
        include_non_singletons: bool,
        allow_eager_init: bool,
    ) -> DependencyResult<Vec<String>> {
        let candidates: Vec<Arc<ComponentDefinition>> = self
            .candidates_for(type_info)
            .into_iter()
            .filter(|d| include_non_singletons || d.is_singleton())
            .collect();

        if allow_eager_init {
            for definition in candidates.iter().filter(|d| d.is_singleton()) {
                self.get_or_create(definition)?;
            }
        }
        Ok(candidates.iter().map(|d| d.name().to_string()).collect())
    }

    fn component_type(&self, name: &str) -> Option<TypeInfo> {
        self.registry.get_definition(name).map(|d| d.type_info())
    }

    fn is_type_match(&self, name: &str, type_info: &TypeInfo) -> bool {
        self.registry
            .get_definition(name)
            .is_some_and(|d| d.matches_type(type_info))
    }

    fn resolve_injection(
        &self,
        point: &InjectionPoint,
        requester: &str,
    ) -> DependencyResult<Option<Value>> {
        let resolved = match &point.target {
            InjectionTarget::Component {
                type_info,
                qualifier: Some(name),
            } => self.resolve_named(name, type_info)?,
            InjectionTarget::Component { type_info, .. } => self.resolve_by_type(type_info)?,
            InjectionTarget::Placeholder { expression, target } => {
                return self.resolve_placeholder(expression, target, point.required, requester);
            }
        };

        match resolved {
            Some(value) => Ok(Some(value)),
            None if point.required => Err(DependencyError::no_such_component(format!(
                "{requester} 需要的依赖 {point}"
            ))),
            None => Ok(None),
        }
    }

    fn environment(&self) -> Option<Arc<dyn Environment>> {
        self.environment.read().clone()
    }

    fn resource_loader(&self) -> Option<Arc<dyn ResourceLoader>> {
        self.resource_loader.read().clone()
    }

    fn conversion_service(&self) -> Arc<dyn ConversionService> {
        self.conversion_service.clone()
    }
}

impl std::fmt::Debug for GenericComponentContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenericComponentContainer")
            .field("definitions", &self.registry.definition_count())
            .field("singletons", &self.singleton_count())
            .field("post_processors", &self.post_processors.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::GenericConversionService;
    use config_impl::{MapPropertySource, StandardEnvironment};
    use di_abstractions::{ComponentContainerExt, DisposableComponent, InitializingComponent};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn container() -> GenericComponentContainer {
        GenericComponentContainer::new(Arc::new(GenericConversionService::with_defaults()))
    }

    trait Storage: Send + Sync {
        fn kind(&self) -> &'static str;
    }

    #[derive(Default)]
    struct Memory;

    impl Storage for Memory {
        fn kind(&self) -> &'static str {
            "memory"
        }
    }

    #[derive(Default)]
    struct Disk;

    impl Storage for Disk {
        fn kind(&self) -> &'static str {
            "disk"
        }
    }

    fn storage_type<C: Storage + Default + 'static>(primary: bool) -> Arc<ComponentType> {
        let builder = ComponentType::builder::<C>()
            .default_constructor()
            .provides::<dyn Storage>(|c| c);
        Arc::new(if primary { builder.primary() } else { builder }.build())
    }

    /// 测试单例返回同一实例，原型每次新建
    #[test]
    fn test_singleton_and_prototype_identity() {
        let container = container();
        container
            .register_definition(ComponentDefinition::of_type(storage_type::<Memory>(false)))
            .unwrap();
        container
            .register_definition(
                ComponentDefinition::of_type(storage_type::<Disk>(false))
                    .with_scope(infrastructure_common::Scope::Prototype),
            )
            .unwrap();

        let a = container.require_bean::<Memory>("memory").unwrap();
        let b = container.require_bean::<Memory>("memory").unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let c = container.require_bean::<Disk>("disk").unwrap();
        let d = container.require_bean::<Disk>("disk").unwrap();
        assert!(!Arc::ptr_eq(&c, &d));
        assert_eq!(container.singleton_names(), vec!["memory".to_string()]);
    }

    /// 测试多个候选时的首选规则
    #[test]
    fn test_primary_tie_break() {
        let ambiguous = container();
        ambiguous
            .register_definition(ComponentDefinition::of_type(storage_type::<Memory>(false)))
            .unwrap();
        ambiguous
            .register_definition(ComponentDefinition::of_type(storage_type::<Disk>(false)))
            .unwrap();
        match ambiguous.get_bean_of_type::<dyn Storage>() {
            Err(DependencyError::AmbiguousComponent { candidates, .. }) => {
                assert_eq!(candidates, vec!["memory".to_string(), "disk".to_string()]);
            }
            other => panic!("意外的结果: {:?}", other.map(|s| s.map(|s| s.kind()))),
        }

        let resolved = container();
        resolved
            .register_definition(ComponentDefinition::of_type(storage_type::<Memory>(false)))
            .unwrap();
        resolved
            .register_definition(ComponentDefinition::of_type(storage_type::<Disk>(true)))
            .unwrap();
        let storage = resolved.require_bean_of_type::<dyn Storage>().unwrap();
        assert_eq!(storage.kind(), "disk");
    }

    /// 测试按名称取用错误类型
    #[test]
    fn test_named_lookup_type_mismatch() {
        let container = container();
        container
            .register_definition(ComponentDefinition::of_type(storage_type::<Memory>(false)))
            .unwrap();

        assert!(matches!(
            container.get_bean::<Disk>("memory"),
            Err(DependencyError::TypeMismatch { .. })
        ));
        assert!(container.get_bean::<Memory>("missing").unwrap().is_none());
        assert!(matches!(
            container.require_bean::<Memory>("missing"),
            Err(DependencyError::NoSuchComponent { .. })
        ));
        assert!(container.is_type_match("memory", &TypeInfo::of::<dyn Storage>()));
        assert!(container.component_type("memory").unwrap().is::<Memory>());
    }

    struct Node {
        _next: Arc<Node>,
    }

    /// 测试自依赖的单例被检测为循环创建
    #[test]
    fn test_self_cycle_detected() {
        let container = container();
        let node = ComponentType::builder::<Node>()
            .constructor(vec![InjectionPoint::named::<Node>("node")], |args| {
                Ok(Node {
                    _next: args.component::<Node>()?,
                })
            })
            .build();
        container
            .register_definition(ComponentDefinition::of_type(Arc::new(node)))
            .unwrap();

        let err = container.get_component("node").unwrap_err();
        assert!(err.is_circular(), "{err}");
        // 失败后创建链已清空，再次请求得到同样的错误而不是死锁
        assert!(container.get_component("node").unwrap_err().is_circular());
    }

    #[derive(Default)]
    struct Lifecycle {
        initialized: bool,
    }

    static DESTROYED: AtomicUsize = AtomicUsize::new(0);

    impl InitializingComponent for Lifecycle {
        fn initialize(&mut self) -> anyhow::Result<()> {
            self.initialized = true;
            Ok(())
        }
    }

    impl DisposableComponent for Lifecycle {
        fn destroy(&self) -> anyhow::Result<()> {
            DESTROYED.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// 测试初始化与销毁回调
    #[test]
    fn test_initialize_and_destroy() {
        let container = container();
        let ty = ComponentType::builder::<Lifecycle>()
            .default_constructor()
            .initializing()
            .disposable()
            .build();
        container
            .register_definition(ComponentDefinition::of_type(Arc::new(ty)))
            .unwrap();

        assert_eq!(container.pre_instantiate_singletons().unwrap(), 1);
        assert!(container.require_bean::<Lifecycle>("lifecycle").unwrap().initialized);

        let before = DESTROYED.load(Ordering::SeqCst);
        container.destroy_singletons();
        assert_eq!(DESTROYED.load(Ordering::SeqCst), before + 1);
        assert_eq!(container.singleton_count(), 0);
    }

    struct Server {
        port: u16,
        name: Option<String>,
        timeout: Option<u32>,
    }

    /// 测试占位符注入与类型转换
    #[test]
    fn test_placeholder_injection() {
        let container = container();
        let environment = StandardEnvironment::new();
        environment.add_last(Arc::new(MapPropertySource::new(
            "test",
            [("server.port", "8080")],
        )));
        container.set_environment(Arc::new(environment));

        let ty = ComponentType::builder::<Server>()
            .constructor(
                vec![
                    InjectionPoint::value::<u16>("${server.port}"),
                    InjectionPoint::value::<String>("${server.name:demo}"),
                    InjectionPoint::value::<u32>("${server.timeout}").optional(),
                ],
                |args| {
                    Ok(Server {
                        port: args.value::<u16>()?,
                        name: args.optional_value::<String>()?,
                        timeout: args.optional_value::<u32>()?,
                    })
                },
            )
            .build();
        container
            .register_definition(ComponentDefinition::of_type(Arc::new(ty)))
            .unwrap();

        let server = container.require_bean::<Server>("server").unwrap();
        assert_eq!(server.port, 8080);
        assert_eq!(server.name.as_deref(), Some("demo"));
        assert_eq!(server.timeout, None);
    }

    /// 测试必需占位符缺失
    #[test]
    fn test_missing_required_placeholder() {
        let container = container();
        let ty = ComponentType::builder::<Server>()
            .constructor(vec![InjectionPoint::value::<u16>("${server.port}")], |args| {
                Ok(Server {
                    port: args.value::<u16>()?,
                    name: None,
                    timeout: None,
                })
            })
            .build();
        container
            .register_definition(ComponentDefinition::of_type(Arc::new(ty)))
            .unwrap();

        assert!(matches!(
            container.get_component("server"),
            Err(DependencyError::NoSuchComponent { .. })
        ));
    }

    /// 测试注册单例与共享句柄
    #[test]
    fn test_register_singletons() {
        let container = container();
        container.register_singleton("memory", Arc::new(Memory)).unwrap();
        container
            .register_shared::<dyn Storage>("storage", Arc::new(Disk))
            .unwrap();

        assert!(container.contains_singleton("memory"));
        assert_eq!(container.require_bean::<dyn Storage>("storage").unwrap().kind(), "disk");
        assert!(matches!(
            container.register_singleton("memory", Arc::new(Memory)),
            Err(DependencyError::Conflict { .. })
        ));

        let names = container.get_bean_names_for_type::<dyn Storage>(true, false).unwrap();
        assert_eq!(names, vec!["storage".to_string()]);
    }

    struct Rejecting {
        armed: std::sync::atomic::AtomicBool,
        calls: AtomicUsize,
    }

    impl ComponentPostProcessor for Rejecting {
        fn name(&self) -> &str {
            "Rejecting"
        }

        fn after_initialization(
            &self,
            _definition: &ComponentDefinition,
            instance: ComponentRef,
            _container: &dyn ComponentContainer,
        ) -> DependencyResult<ComponentRef> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.armed.load(Ordering::SeqCst) {
                return Err(DependencyError::illegal_state("处理器拒绝了组件"));
            }
            Ok(instance)
        }
    }

    /// 测试后处理器出错时错误原样返回，不缓存半成品且创建链被清空
    #[test]
    fn test_post_processor_failure_leaves_no_singleton() {
        let container = container();
        let rejecting = Arc::new(Rejecting {
            armed: std::sync::atomic::AtomicBool::new(true),
            calls: AtomicUsize::new(0),
        });
        container.add_post_processor(rejecting.clone());
        container
            .register_definition(ComponentDefinition::of_type(storage_type::<Memory>(false)))
            .unwrap();

        match container.get_component("memory") {
            Err(DependencyError::IllegalState { .. }) => {}
            Err(other) => panic!("意外的错误: {other}"),
            Ok(_) => panic!("后处理器的错误应当被传播"),
        }
        assert!(!container.contains_singleton("memory"));
        assert!(container.singleton_names().is_empty());

        rejecting.armed.store(false, Ordering::SeqCst);
        let instance = container.get_component("memory").unwrap();
        assert!(instance.is_some());
        assert!(container.contains_singleton("memory"));
        assert_eq!(rejecting.calls.load(Ordering::SeqCst), 2);
    }

    /// 测试显式依赖先创建
    #[test]
    fn test_depends_on_created_first() {
        let container = container();
        container
            .register_definition(
                ComponentDefinition::of_type(storage_type::<Memory>(false)).with_depends_on("disk"),
            )
            .unwrap();
        container
            .register_definition(ComponentDefinition::of_type(storage_type::<Disk>(false)))
            .unwrap();

        container.get_component("memory").unwrap();
        assert_eq!(
            container.singleton_names(),
            vec!["disk".to_string(), "memory".to_string()]
        );

        container
            .register_definition(
                ComponentDefinition::constructed("orphan", storage_type::<Memory>(false))
                    .with_depends_on("missing"),
            )
            .unwrap();
        assert!(matches!(
            container.get_component("orphan"),
            Err(DependencyError::NoSuchComponent { .. })
        ));
    }
}
