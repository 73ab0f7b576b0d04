//! 组件类型元数据
//!
//! 每个组件类型对应一条 [`ComponentType`]：构造函数参数、字段注入点、
//! 可被视为的类型（具体类型与 `dyn Trait`）、能力声明以及组件/配置模块标记。
//! 元数据通过 [`ComponentTypeBuilder`] 显式构建，运行时只读取这些描述。

use crate::aware::{
    apply_container, apply_destroy, apply_environment, apply_initialize, apply_name,
    apply_resource_loader, Capabilities, ContainerAware, DisposableComponent, EnvironmentAware,
    InitializingComponent, NameAware, ResourceLoaderAware,
};
use crate::conversion::TypeConverter;
use crate::event::EventListener;
use crate::injection::{Arguments, InjectionPoint};
use crate::instance::{downcast_component, downcast_value, ComponentRef, RawInstance, Value};
use crate::processor::{ComponentPostProcessor, RegistryPostProcessor};
use infrastructure_common::{
    default_component_name, dotted_type_name, DependencyError, DependencyResult,
    Scope, TypeInfo,
};
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// 类型转换函数：把组件实例转为装箱的 `Arc<T>`
pub type CastFn = Arc<dyn Fn(ComponentRef) -> Option<Value> + Send + Sync>;

/// 组件可被视为的一种类型
#[derive(Clone)]
pub struct TypeBinding {
    type_info: TypeInfo,
    cast: CastFn,
}

impl TypeBinding {
    /// 具体类型自身
    pub fn concrete<C: Any + Send + Sync>() -> Self {
        Self {
            type_info: TypeInfo::of::<C>(),
            cast: Arc::new(|instance: ComponentRef| {
                instance
                    .downcast::<C>()
                    .ok()
                    .map(|component| Box::new(component) as Value)
            }),
        }
    }

    /// 具体类型 `C` 作为 `I`（通常是 `dyn Trait`）
    pub fn interface<C, I>(cast: fn(Arc<C>) -> Arc<I>) -> Self
    where
        C: Any + Send + Sync,
        I: ?Sized + Send + Sync + 'static,
    {
        Self {
            type_info: TypeInfo::of::<I>(),
            cast: Arc::new(move |instance: ComponentRef| {
                instance
                    .downcast::<C>()
                    .ok()
                    .map(|component| Box::new(cast(component)) as Value)
            }),
        }
    }

    /// 以 `Arc<I>` 句柄保存的共享实例
    ///
    /// 实例本身为 `Arc<I>`，取用时克隆句柄。
    pub fn shared<I>() -> Self
    where
        I: ?Sized + Send + Sync + 'static,
    {
        Self {
            type_info: TypeInfo::of::<I>(),
            cast: Arc::new(|instance: ComponentRef| {
                instance
                    .downcast::<Arc<I>>()
                    .ok()
                    .map(|handle| Box::new(Arc::clone(&handle)) as Value)
            }),
        }
    }

    /// 绑定的类型
    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    /// 转换实例，实例的具体类型不符时返回 `None`
    pub fn cast(&self, instance: ComponentRef) -> Option<Value> {
        (self.cast)(instance)
    }
}

impl fmt::Debug for TypeBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeBinding").field(&self.type_info.name).finish()
    }
}

/// 构造函数调用
pub type ConstructorFn = Arc<dyn Fn(&mut Arguments) -> anyhow::Result<RawInstance> + Send + Sync>;

/// 构造函数描述
#[derive(Clone)]
pub struct ConstructorDescriptor {
    parameters: Vec<InjectionPoint>,
    invoke: ConstructorFn,
}

impl ConstructorDescriptor {
    /// 参数注入点
    pub fn parameters(&self) -> &[InjectionPoint] {
        &self.parameters
    }

    /// 调用构造函数
    pub fn invoke(&self, arguments: &mut Arguments) -> anyhow::Result<RawInstance> {
        (self.invoke)(arguments)
    }
}

/// 字段注入函数
pub type InjectFn =
    Arc<dyn Fn(&mut (dyn Any + Send + Sync), Value) -> DependencyResult<()> + Send + Sync>;

/// 字段注入点
#[derive(Clone)]
pub struct FieldInjector {
    field: &'static str,
    point: InjectionPoint,
    apply: InjectFn,
}

impl FieldInjector {
    /// 字段名
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// 注入点
    pub fn point(&self) -> &InjectionPoint {
        &self.point
    }

    /// 把解析到的值写入实例
    pub fn inject(&self, instance: &mut (dyn Any + Send + Sync), value: Value) -> DependencyResult<()> {
        (self.apply)(instance, value)
    }
}

/// 组件标记，可带显式名称
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentMarker {
    pub name: Option<String>,
}

/// 配置模块标记
#[derive(Clone, Default)]
pub struct ConfigurationMarker {
    /// 产出组件的工厂方法
    pub factory_methods: Vec<Arc<FactoryMethod>>,
    /// 显式导入的类型
    pub imports: Vec<Arc<ComponentType>>,
}

/// 组件类型元数据
#[derive(Clone)]
pub struct ComponentType {
    type_info: TypeInfo,
    bindings: Vec<TypeBinding>,
    constructor: Option<ConstructorDescriptor>,
    injectors: Vec<FieldInjector>,
    capabilities: Capabilities,
    scope: Scope,
    lazy: bool,
    primary: bool,
    depends_on: Vec<String>,
    component: Option<ComponentMarker>,
    configuration: Option<ConfigurationMarker>,
}

impl ComponentType {
    /// 开始构建类型 `C` 的元数据
    pub fn builder<C: Any + Send + Sync>() -> ComponentTypeBuilder<C> {
        ComponentTypeBuilder::new()
    }

    /// 只含具体类型绑定的最简元数据
    pub fn of<C: Any + Send + Sync>() -> Self {
        Self::builder::<C>().build()
    }

    /// 以 `Arc<I>` 句柄注册的共享实例的元数据，`I` 通常是 `dyn Trait`
    pub fn shared<I>() -> Self
    where
        I: ?Sized + Send + Sync + 'static,
    {
        Self::bare(TypeInfo::of::<I>(), TypeBinding::shared::<I>())
    }

    fn bare(type_info: TypeInfo, binding: TypeBinding) -> Self {
        Self {
            type_info,
            bindings: vec![binding],
            constructor: None,
            injectors: Vec::new(),
            capabilities: Capabilities::default(),
            scope: Scope::Singleton,
            lazy: false,
            primary: false,
            depends_on: Vec::new(),
            component: None,
            configuration: None,
        }
    }

    /// 类型信息
    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    /// 全部类型绑定，第一项为具体类型
    pub fn bindings(&self) -> &[TypeBinding] {
        &self.bindings
    }

    /// 查找指定类型的绑定
    pub fn binding_for(&self, type_info: &TypeInfo) -> Option<&TypeBinding> {
        self.bindings.iter().find(|b| b.type_info.id == type_info.id)
    }

    /// 是否可被视为指定类型
    pub fn provides(&self, type_info: &TypeInfo) -> bool {
        self.binding_for(type_info).is_some()
    }

    /// 构造函数
    pub fn constructor(&self) -> Option<&ConstructorDescriptor> {
        self.constructor.as_ref()
    }

    /// 字段注入点
    pub fn injectors(&self) -> &[FieldInjector] {
        &self.injectors
    }

    /// 能力声明
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// 作用域
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// 是否延迟初始化
    pub fn is_lazy(&self) -> bool {
        self.lazy
    }

    /// 是否为首选组件
    pub fn is_primary(&self) -> bool {
        self.primary
    }

    /// 显式依赖的组件名称
    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    /// 组件标记
    pub fn component_marker(&self) -> Option<&ComponentMarker> {
        self.component.as_ref()
    }

    /// 配置模块标记
    pub fn configuration(&self) -> Option<&ConfigurationMarker> {
        self.configuration.as_ref()
    }

    /// 是否为配置模块
    pub fn is_configuration(&self) -> bool {
        self.configuration.is_some()
    }

    /// 默认组件名称：组件标记中的显式名称，否则为首字母小写的类型名
    pub fn default_name(&self) -> String {
        self.component
            .as_ref()
            .and_then(|marker| marker.name.clone())
            .unwrap_or_else(|| default_component_name(&self.type_info))
    }
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bindings: Vec<&str> = self.bindings.iter().map(|b| b.type_info.name).collect();
        f.debug_struct("ComponentType")
            .field("type", &self.type_info.module_path)
            .field("bindings", &bindings)
            .field("scope", &self.scope)
            .field("lazy", &self.lazy)
            .field("primary", &self.primary)
            .field("component", &self.component)
            .field("configuration", &self.configuration.is_some())
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

/// 组件类型元数据构建器
pub struct ComponentTypeBuilder<C> {
    inner: ComponentType,
    _component: PhantomData<fn() -> C>,
}

impl<C: Any + Send + Sync> ComponentTypeBuilder<C> {
    /// 创建构建器，默认包含具体类型绑定
    pub fn new() -> Self {
        Self {
            inner: ComponentType::bare(TypeInfo::of::<C>(), TypeBinding::concrete::<C>()),
            _component: PhantomData,
        }
    }

    /// 声明构造函数
    pub fn constructor<F>(mut self, parameters: Vec<InjectionPoint>, constructor: F) -> Self
    where
        F: Fn(&mut Arguments) -> anyhow::Result<C> + Send + Sync + 'static,
    {
        self.inner.constructor = Some(ConstructorDescriptor {
            parameters,
            invoke: Arc::new(move |arguments: &mut Arguments| {
                constructor(arguments).map(RawInstance::new)
            }),
        });
        self
    }

    /// 使用 `Default` 作为无参构造函数
    pub fn default_constructor(self) -> Self
    where
        C: Default,
    {
        self.constructor(Vec::new(), |_| Ok(C::default()))
    }

    /// 声明组件可被视为 `I`
    pub fn provides<I>(mut self, cast: fn(Arc<C>) -> Arc<I>) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
    {
        let binding = TypeBinding::interface::<C, I>(cast);
        if self.inner.binding_for(&binding.type_info).is_none() {
            self.inner.bindings.push(binding);
        }
        self
    }

    /// 标记为组件
    pub fn component(mut self) -> Self {
        self.inner.component.get_or_insert_with(ComponentMarker::default);
        self
    }

    /// 标记为组件并指定名称
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.inner.component = Some(ComponentMarker {
            name: Some(name.into()),
        });
        self
    }

    /// 标记为首选组件
    pub fn primary(mut self) -> Self {
        self.inner.primary = true;
        self
    }

    /// 设置作用域
    pub fn scope(mut self, scope: Scope) -> Self {
        self.inner.scope = scope;
        self
    }

    /// 原型作用域
    pub fn prototype(self) -> Self {
        self.scope(Scope::Prototype)
    }

    /// 延迟初始化
    pub fn lazy(mut self) -> Self {
        self.inner.lazy = true;
        self
    }

    /// 显式依赖另一个组件，创建本组件前先创建它
    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        self.inner.depends_on.push(name.into());
        self
    }

    /// 字段注入组件依赖
    pub fn inject_component<T>(
        mut self,
        field: &'static str,
        point: InjectionPoint,
        setter: fn(&mut C, Arc<T>),
    ) -> Self
    where
        T: ?Sized + 'static,
    {
        let apply: InjectFn = Arc::new(move |instance: &mut (dyn Any + Send + Sync), value: Value| {
            let component = downcast_target::<C>(instance, field)?;
            setter(component, downcast_component::<T>(value, field)?);
            Ok(())
        });
        self.inner.injectors.push(FieldInjector { field, point, apply });
        self
    }

    /// 字段注入占位符值
    pub fn inject_value<V: Any>(
        mut self,
        field: &'static str,
        point: InjectionPoint,
        setter: fn(&mut C, V),
    ) -> Self {
        let apply: InjectFn = Arc::new(move |instance: &mut (dyn Any + Send + Sync), value: Value| {
            let component = downcast_target::<C>(instance, field)?;
            setter(component, downcast_value::<V>(value, field)?);
            Ok(())
        });
        self.inner.injectors.push(FieldInjector { field, point, apply });
        self
    }

    /// 需要注入组件名称
    pub fn name_aware(mut self) -> Self
    where
        C: NameAware,
    {
        self.inner.capabilities.name_aware = Some(apply_name::<C>);
        self
    }

    /// 需要注入容器句柄
    pub fn container_aware(mut self) -> Self
    where
        C: ContainerAware,
    {
        self.inner.capabilities.container_aware = Some(apply_container::<C>);
        self
    }

    /// 需要注入属性环境
    pub fn environment_aware(mut self) -> Self
    where
        C: EnvironmentAware,
    {
        self.inner.capabilities.environment_aware = Some(apply_environment::<C>);
        self
    }

    /// 需要注入资源加载器
    pub fn resource_loader_aware(mut self) -> Self
    where
        C: ResourceLoaderAware,
    {
        self.inner.capabilities.resource_loader_aware = Some(apply_resource_loader::<C>);
        self
    }

    /// 带初始化回调
    pub fn initializing(mut self) -> Self
    where
        C: InitializingComponent,
    {
        self.inner.capabilities.initializing = Some(apply_initialize::<C>);
        self
    }

    /// 带销毁回调
    pub fn disposable(mut self) -> Self
    where
        C: DisposableComponent,
    {
        self.inner.capabilities.disposable = Some(apply_destroy::<C>);
        self
    }

    /// 作为类型转换器，创建后注册到转换服务
    pub fn converter(self) -> Self
    where
        C: TypeConverter,
    {
        self.provides::<dyn TypeConverter>(|c| c)
    }

    /// 作为事件监听器，创建后注册到事件发布器
    pub fn listener(self) -> Self
    where
        C: EventListener,
    {
        self.provides::<dyn EventListener>(|c| c)
    }

    /// 作为组件后处理器，刷新时加入处理流水线
    pub fn post_processor(self) -> Self
    where
        C: ComponentPostProcessor,
    {
        self.provides::<dyn ComponentPostProcessor>(|c| c)
    }

    /// 作为注册表后处理器，刷新时在解析阶段执行
    pub fn registry_post_processor(self) -> Self
    where
        C: RegistryPostProcessor,
    {
        self.provides::<dyn RegistryPostProcessor>(|c| c)
    }

    /// 标记为配置模块
    pub fn configuration(mut self) -> Self {
        self.inner
            .configuration
            .get_or_insert_with(ConfigurationMarker::default);
        self
    }

    /// 添加工厂方法，同时标记为配置模块
    pub fn bean(mut self, method: FactoryMethod) -> Self {
        self.inner
            .configuration
            .get_or_insert_with(ConfigurationMarker::default)
            .factory_methods
            .push(Arc::new(method));
        self
    }

    /// 显式导入类型，同时标记为配置模块
    pub fn import(mut self, component_type: Arc<ComponentType>) -> Self {
        self.inner
            .configuration
            .get_or_insert_with(ConfigurationMarker::default)
            .imports
            .push(component_type);
        self
    }

    /// 完成构建
    pub fn build(self) -> ComponentType {
        self.inner
    }
}

impl<C: Any + Send + Sync> Default for ComponentTypeBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

fn downcast_target<'a, C: Any>(
    instance: &'a mut (dyn Any + Send + Sync),
    field: &str,
) -> DependencyResult<&'a mut C> {
    instance
        .downcast_mut::<C>()
        .ok_or_else(|| DependencyError::TypeMismatch {
            name: field.to_string(),
            expected: TypeInfo::of::<C>().module_path.to_string(),
            actual: "未知类型".to_string(),
        })
}

/// 工厂方法调用：模块实例 + 参数
pub type InvokeFn =
    Arc<dyn Fn(&(dyn Any + Send + Sync), &mut Arguments) -> anyhow::Result<RawInstance> + Send + Sync>;

/// 配置模块中产出组件的工厂方法
#[derive(Clone)]
pub struct FactoryMethod {
    method_name: String,
    component_name: Option<String>,
    module_type: TypeInfo,
    produced: Arc<ComponentType>,
    parameters: Vec<InjectionPoint>,
    invoke: InvokeFn,
    scope: Scope,
    lazy: bool,
    primary: bool,
    depends_on: Vec<String>,
}

impl FactoryMethod {
    /// 开始构建模块 `M` 上产出 `R` 的工厂方法
    pub fn builder<M, R>(method_name: impl Into<String>) -> FactoryMethodBuilder<M, R>
    where
        M: Any + Send + Sync,
        R: Any + Send + Sync,
    {
        FactoryMethodBuilder::new(method_name.into())
    }

    /// 方法名
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// 组件名称：显式名称，否则为方法名
    pub fn component_name(&self) -> String {
        self.component_name
            .clone()
            .unwrap_or_else(|| self.method_name.clone())
    }

    /// 声明该方法的模块类型
    pub fn module_type(&self) -> TypeInfo {
        self.module_type
    }

    /// 产出类型的元数据
    pub fn produced(&self) -> &Arc<ComponentType> {
        &self.produced
    }

    /// 参数注入点
    pub fn parameters(&self) -> &[InjectionPoint] {
        &self.parameters
    }

    /// 作用域
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// 是否延迟初始化
    pub fn is_lazy(&self) -> bool {
        self.lazy
    }

    /// 是否为首选组件
    pub fn is_primary(&self) -> bool {
        self.primary
    }

    /// 显式依赖
    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    /// 在模块实例上调用
    pub fn invoke(
        &self,
        module: &(dyn Any + Send + Sync),
        arguments: &mut Arguments,
    ) -> anyhow::Result<RawInstance> {
        (self.invoke)(module, arguments)
    }
}

impl fmt::Debug for FactoryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryMethod")
            .field("method", &self.method_name)
            .field("module", &self.module_type.name)
            .field("produces", &self.produced.type_info().name)
            .field("parameters", &self.parameters.len())
            .finish_non_exhaustive()
    }
}

/// 工厂方法构建器
///
/// 作用域、延迟、首选与依赖均取自方法自身的声明，与所在模块无关。
pub struct FactoryMethodBuilder<M, R> {
    method_name: String,
    component_name: Option<String>,
    parameters: Vec<InjectionPoint>,
    produced: ComponentTypeBuilder<R>,
    scope: Scope,
    lazy: bool,
    primary: bool,
    depends_on: Vec<String>,
    _module: PhantomData<fn() -> M>,
}

impl<M, R> FactoryMethodBuilder<M, R>
where
    M: Any + Send + Sync,
    R: Any + Send + Sync,
{
    fn new(method_name: String) -> Self {
        Self {
            method_name,
            component_name: None,
            parameters: Vec::new(),
            produced: ComponentTypeBuilder::new(),
            scope: Scope::Singleton,
            lazy: false,
            primary: false,
            depends_on: Vec::new(),
            _module: PhantomData,
        }
    }

    /// 指定组件名称
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.component_name = Some(name.into());
        self
    }

    /// 追加参数
    pub fn parameter(mut self, point: InjectionPoint) -> Self {
        self.parameters.push(point);
        self
    }

    /// 首选组件
    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    /// 原型作用域
    pub fn prototype(mut self) -> Self {
        self.scope = Scope::Prototype;
        self
    }

    /// 延迟初始化
    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }

    /// 显式依赖
    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        self.depends_on.push(name.into());
        self
    }

    /// 产出组件可被视为 `I`
    pub fn provides<I>(mut self, cast: fn(Arc<R>) -> Arc<I>) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
    {
        self.produced = self.produced.provides(cast);
        self
    }

    /// 描述产出类型的其余元数据，例如能力声明
    pub fn describe<F>(mut self, describe: F) -> Self
    where
        F: FnOnce(ComponentTypeBuilder<R>) -> ComponentTypeBuilder<R>,
    {
        self.produced = describe(self.produced);
        self
    }

    /// 以方法体完成构建
    pub fn build<F>(self, method: F) -> FactoryMethod
    where
        F: Fn(&M, &mut Arguments) -> anyhow::Result<R> + Send + Sync + 'static,
    {
        let invoke: InvokeFn = Arc::new(
            move |module: &(dyn Any + Send + Sync), arguments: &mut Arguments| {
                let module = module
                    .downcast_ref::<M>()
                    .ok_or_else(|| DependencyError::TypeMismatch {
                        name: "module".to_string(),
                        expected: TypeInfo::of::<M>().module_path.to_string(),
                        actual: "未知类型".to_string(),
                    })?;
                method(module, arguments).map(RawInstance::new)
            },
        );

        FactoryMethod {
            method_name: self.method_name,
            component_name: self.component_name,
            module_type: TypeInfo::of::<M>(),
            produced: Arc::new(self.produced.build()),
            parameters: self.parameters,
            invoke,
            scope: self.scope,
            lazy: self.lazy,
            primary: self.primary,
            depends_on: self.depends_on,
        }
    }
}

/// 类型元数据表
///
/// 以 `.` 分隔的完整类型名为键，供清单解析按名称查找类型。
#[derive(Default)]
pub struct TypeMetadataTable {
    types: RwLock<HashMap<String, Arc<ComponentType>>>,
}

impl TypeMetadataTable {
    /// 创建空表
    pub fn new() -> Self {
        Self::default()
    }

    /// 以完整类型名登记
    pub fn register(&self, component_type: Arc<ComponentType>) {
        let key = component_type.type_info().dotted_name();
        self.types.write().insert(key, component_type);
    }

    /// 以别名登记
    pub fn register_alias(&self, alias: impl AsRef<str>, component_type: Arc<ComponentType>) {
        self.types
            .write()
            .insert(dotted_type_name(alias.as_ref()), component_type);
    }

    /// 按名称查找，`a::b::C` 与 `a.b.C` 等价
    pub fn get(&self, name: &str) -> Option<Arc<ComponentType>> {
        self.types.read().get(&dotted_type_name(name)).cloned()
    }

    /// 是否包含
    pub fn contains(&self, name: &str) -> bool {
        self.types.read().contains_key(&dotted_type_name(name))
    }

    /// 条目数量
    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }
}

impl fmt::Debug for TypeMetadataTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self.types.read().keys().cloned().collect();
        names.sort();
        f.debug_struct("TypeMetadataTable").field("types", &names).finish()
    }
}
