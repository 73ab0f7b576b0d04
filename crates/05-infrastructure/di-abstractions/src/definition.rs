//! 组件定义

use crate::factory::{ComponentFactory, ConstructorFactory, InstanceFactory, MethodFactory};
use crate::instance::ComponentRef;
use crate::metadata::{ComponentType, FactoryMethod};
use infrastructure_common::{Scope, TypeInfo};
use std::fmt;
use std::sync::Arc;

/// 组件定义
///
/// 描述组件的名称、类型、作用域与工厂。定义注册后不再修改，
/// 构造逻辑全部由工厂持有。
#[derive(Clone)]
pub struct ComponentDefinition {
    name: String,
    type_info: TypeInfo,
    singleton: bool,
    lazy: bool,
    depends_on: Vec<String>,
    primary: bool,
    factory: Arc<dyn ComponentFactory>,
    metadata: Arc<ComponentType>,
}

impl ComponentDefinition {
    /// 由工厂创建定义，作用域与延迟取自工厂
    pub fn new(
        name: impl Into<String>,
        factory: Arc<dyn ComponentFactory>,
        metadata: Arc<ComponentType>,
    ) -> Self {
        Self {
            name: name.into(),
            type_info: factory.produced_type(),
            singleton: factory.is_singleton(),
            lazy: factory.is_lazy(),
            depends_on: metadata.depends_on().to_vec(),
            primary: metadata.is_primary(),
            factory,
            metadata,
        }
    }

    /// 以构造函数创建的组件，名称取类型的默认名称
    pub fn of_type(metadata: Arc<ComponentType>) -> Self {
        let name = metadata.default_name();
        Self::constructed(name, metadata)
    }

    /// 以构造函数创建的组件，使用指定名称
    pub fn constructed(name: impl Into<String>, metadata: Arc<ComponentType>) -> Self {
        let factory = Arc::new(ConstructorFactory::new(metadata.clone()));
        Self::new(name, factory, metadata)
    }

    /// 由配置模块的工厂方法创建的组件
    ///
    /// 作用域、延迟、首选与依赖全部取自方法自身的声明。
    pub fn for_method(module_name: impl Into<String>, method: Arc<FactoryMethod>) -> Self {
        let metadata = method.produced().clone();
        let mut definition = Self::new(
            method.component_name(),
            Arc::new(MethodFactory::new(module_name, method.clone())),
            metadata,
        );
        definition.primary = method.is_primary();
        definition.depends_on = method.depends_on().to_vec();
        definition
    }

    /// 预先构建的实例
    pub fn for_instance(
        name: impl Into<String>,
        instance: ComponentRef,
        metadata: Arc<ComponentType>,
    ) -> Self {
        let factory = Arc::new(InstanceFactory::new(instance, metadata.type_info()));
        let mut definition = Self::new(name, factory, metadata);
        definition.lazy = true;
        definition
    }

    /// 组件名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 产出的具体类型
    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    /// 是否单例
    pub fn is_singleton(&self) -> bool {
        self.singleton
    }

    /// 作用域
    pub fn scope(&self) -> Scope {
        if self.singleton {
            Scope::Singleton
        } else {
            Scope::Prototype
        }
    }

    /// 是否延迟初始化
    pub fn is_lazy(&self) -> bool {
        self.lazy
    }

    /// 显式依赖
    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    /// 是否首选
    pub fn is_primary(&self) -> bool {
        self.primary
    }

    /// 工厂
    pub fn factory(&self) -> &Arc<dyn ComponentFactory> {
        &self.factory
    }

    /// 类型元数据
    pub fn metadata(&self) -> &Arc<ComponentType> {
        &self.metadata
    }

    /// 组件能否被视为指定类型
    pub fn matches_type(&self, type_info: &TypeInfo) -> bool {
        self.metadata.provides(type_info)
    }

    /// 是否为配置模块
    pub fn is_configuration(&self) -> bool {
        self.metadata.is_configuration()
    }

    /// 更换名称
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 设置首选标记
    pub fn with_primary(mut self, primary: bool) -> Self {
        self.primary = primary;
        self
    }

    /// 设置延迟初始化
    pub fn with_lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }

    /// 设置作用域
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.singleton = scope.is_singleton();
        self
    }

    /// 追加显式依赖
    pub fn with_depends_on(mut self, name: impl Into<String>) -> Self {
        self.depends_on.push(name.into());
        self
    }
}

impl fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("name", &self.name)
            .field("type", &self.type_info.name)
            .field("singleton", &self.singleton)
            .field("lazy", &self.lazy)
            .field("primary", &self.primary)
            .field("depends_on", &self.depends_on)
            .field("configuration", &self.is_configuration())
            .finish()
    }
}
