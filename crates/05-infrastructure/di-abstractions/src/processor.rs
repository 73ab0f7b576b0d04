//! 处理器抽象接口
//!
//! - [`ComponentPostProcessor`] 在组件初始化前后执行
//! - [`RegistryPostProcessor`] 在实例化之前修改定义注册表
//! - [`ConfigurationResolver`] 把配置模块展开为更多定义

use crate::container::ComponentContainer;
use crate::definition::ComponentDefinition;
use crate::instance::{ComponentRef, RawInstance};
use crate::registry::DefinitionRegistry;
use infrastructure_common::DependencyResult;
use std::sync::Arc;

/// 组件后处理器
pub trait ComponentPostProcessor: Send + Sync {
    /// 处理器名称，用于日志
    fn name(&self) -> &str;

    /// 优先级，数值越小越先执行；`None` 排在所有有优先级的处理器之后
    fn priority(&self) -> Option<i32> {
        None
    }

    /// 初始化回调之前，可修改原始实例
    fn before_initialization(
        &self,
        _definition: &ComponentDefinition,
        _instance: &mut RawInstance,
        _container: &dyn ComponentContainer,
    ) -> DependencyResult<()> {
        Ok(())
    }

    /// 初始化回调之后，可登记或替换实例
    fn after_initialization(
        &self,
        _definition: &ComponentDefinition,
        instance: ComponentRef,
        _container: &dyn ComponentContainer,
    ) -> DependencyResult<ComponentRef> {
        Ok(instance)
    }
}

/// 定义注册表后处理器
pub trait RegistryPostProcessor: Send + Sync {
    /// 处理器名称，用于日志
    fn name(&self) -> &str;

    /// 优先级，规则同 [`ComponentPostProcessor::priority`]
    fn priority(&self) -> Option<i32> {
        None
    }

    /// 处理注册表
    fn post_process_registry(&self, registry: &dyn DefinitionRegistry) -> DependencyResult<()>;
}

/// 配置解析器
pub trait ConfigurationResolver: Send + Sync {
    /// 解析器名称
    fn name(&self) -> &str;

    /// 是否适用于该配置模块
    fn supports(&self, module: &ComponentDefinition) -> bool;

    /// 产出新的组件定义
    fn resolve(&self, module: &ComponentDefinition) -> DependencyResult<Vec<ComponentDefinition>>;

    /// 模块定义的附加名称，登记为别名而不是新定义
    fn aliases(&self, _module: &ComponentDefinition) -> Vec<String> {
        Vec::new()
    }
}

/// 按优先级稳定排序：有优先级的升序在前，其余保持注册顺序
pub fn order_by_priority<T, F>(items: &mut [Arc<T>], priority: F)
where
    T: ?Sized,
    F: Fn(&T) -> Option<i32>,
{
    items.sort_by_key(|item| match priority(item) {
        Some(value) => (0, value),
        None => (1, 0),
    });
}
