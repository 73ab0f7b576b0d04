//! 组件工厂
//!
//! 三种产出原始实例的方式：
//!
//! - [`ConstructorFactory`] - 解析构造函数参数并调用构造函数
//! - [`MethodFactory`] - 先取得配置模块实例，再调用其工厂方法
//! - [`InstanceFactory`] - 返回预先构建的实例

use crate::container::ComponentContainer;
use crate::injection::{Arguments, InjectionPoint};
use crate::instance::{ComponentRef, RawInstance};
use crate::metadata::{ComponentType, FactoryMethod};
use infrastructure_common::{DependencyError, DependencyResult, TypeInfo};
use std::sync::Arc;
use tracing::debug;

/// 组件工厂
pub trait ComponentFactory: Send + Sync {
    /// 产出的具体类型
    fn produced_type(&self) -> TypeInfo;

    /// 是否单例
    fn is_singleton(&self) -> bool;

    /// 是否延迟初始化
    fn is_lazy(&self) -> bool;

    /// 产出原始实例，参数通过容器递归解析
    fn build(&self, container: &dyn ComponentContainer) -> DependencyResult<RawInstance>;
}

/// 依次解析注入点，组装参数列表
pub fn resolve_arguments(
    container: &dyn ComponentContainer,
    parameters: &[InjectionPoint],
    requester: &str,
) -> DependencyResult<Arguments> {
    let mut values = Vec::with_capacity(parameters.len());
    for point in parameters {
        let value = container.resolve_injection(point, requester)?;
        values.push((point.clone(), value));
    }
    Ok(Arguments::new(values))
}

/// 把用户代码返回的错误转为依赖错误
///
/// 容器自身的错误原样传出，其余错误包装为 `ComponentCreationFailed`。
pub fn into_dependency_error(error: anyhow::Error, name: &str) -> DependencyError {
    match error.downcast::<DependencyError>() {
        Ok(dependency_error) => dependency_error,
        Err(other) => DependencyError::creation_failed(name, other),
    }
}

/// 构造函数工厂
pub struct ConstructorFactory {
    metadata: Arc<ComponentType>,
}

impl ConstructorFactory {
    /// 创建构造函数工厂
    pub fn new(metadata: Arc<ComponentType>) -> Self {
        Self { metadata }
    }
}

impl ComponentFactory for ConstructorFactory {
    fn produced_type(&self) -> TypeInfo {
        self.metadata.type_info()
    }

    fn is_singleton(&self) -> bool {
        self.metadata.scope().is_singleton()
    }

    fn is_lazy(&self) -> bool {
        self.metadata.is_lazy()
    }

    fn build(&self, container: &dyn ComponentContainer) -> DependencyResult<RawInstance> {
        let type_name = self.metadata.type_info().short_name();
        let constructor = self.metadata.constructor().ok_or_else(|| {
            DependencyError::creation_failed(type_name, format!("类型 {type_name} 未声明构造函数"))
        })?;

        debug!("调用构造函数: {} ({} 个参数)", type_name, constructor.parameters().len());
        let mut arguments = resolve_arguments(container, constructor.parameters(), type_name)?;
        constructor
            .invoke(&mut arguments)
            .map_err(|e| into_dependency_error(e, type_name))
    }
}

/// 工厂方法工厂
pub struct MethodFactory {
    module_name: String,
    method: Arc<FactoryMethod>,
}

impl MethodFactory {
    /// 创建工厂方法工厂
    pub fn new(module_name: impl Into<String>, method: Arc<FactoryMethod>) -> Self {
        Self {
            module_name: module_name.into(),
            method,
        }
    }

    /// 声明该方法的配置模块名称
    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// 工厂方法
    pub fn method(&self) -> &Arc<FactoryMethod> {
        &self.method
    }
}

impl ComponentFactory for MethodFactory {
    fn produced_type(&self) -> TypeInfo {
        self.method.produced().type_info()
    }

    fn is_singleton(&self) -> bool {
        self.method.scope().is_singleton()
    }

    fn is_lazy(&self) -> bool {
        self.method.is_lazy()
    }

    fn build(&self, container: &dyn ComponentContainer) -> DependencyResult<RawInstance> {
        let method_name = self.method.method_name();
        let module = container.get_component(&self.module_name)?.ok_or_else(|| {
            DependencyError::no_such_component(format!(
                "工厂方法 {method_name} 所在的配置模块 {}",
                self.module_name
            ))
        })?;

        debug!("调用工厂方法: {}.{}", self.module_name, method_name);
        let mut arguments = resolve_arguments(container, self.method.parameters(), method_name)?;
        self.method
            .invoke(module.as_ref(), &mut arguments)
            .map_err(|e| into_dependency_error(e, method_name))
    }
}

/// 预构建实例工厂
pub struct InstanceFactory {
    instance: ComponentRef,
    type_info: TypeInfo,
}

impl InstanceFactory {
    /// 包装预先构建的实例
    pub fn new(instance: ComponentRef, type_info: TypeInfo) -> Self {
        Self {
            instance,
            type_info,
        }
    }
}

impl ComponentFactory for InstanceFactory {
    fn produced_type(&self) -> TypeInfo {
        self.type_info
    }

    fn is_singleton(&self) -> bool {
        true
    }

    fn is_lazy(&self) -> bool {
        true
    }

    fn build(&self, _container: &dyn ComponentContainer) -> DependencyResult<RawInstance> {
        Ok(RawInstance::Shared(self.instance.clone()))
    }
}
