//! 组件定义注册表抽象接口

use crate::definition::ComponentDefinition;
use infrastructure_common::DependencyResult;
use std::sync::Arc;

/// 组件定义注册表
///
/// 名称唯一；查询结果按注册顺序返回。
pub trait DefinitionRegistry: Send + Sync {
    /// 注册定义，名称已存在时返回 `Conflict` 且不修改注册表
    fn register_definition(&self, definition: ComponentDefinition) -> DependencyResult<()>;

    /// 移除定义
    fn remove_definition(&self, name: &str) -> Option<Arc<ComponentDefinition>>;

    /// 为已注册的定义登记别名
    ///
    /// 定义不存在时返回 `NoSuchComponent`；别名已被定义或其他别名占用时返回 `Conflict`。
    fn register_alias(&self, name: &str, alias: &str) -> DependencyResult<()>;

    /// 定义的全部别名，按登记顺序
    fn aliases(&self, name: &str) -> Vec<String>;

    /// 按名称或别名获取定义
    fn get_definition(&self, name: &str) -> Option<Arc<ComponentDefinition>>;

    /// 是否包含指定名称或别名
    fn contains_definition(&self, name: &str) -> bool;

    /// 所有定义名称，不含别名
    fn definition_names(&self) -> Vec<String>;

    /// 按条件查询定义
    fn definitions_matching(
        &self,
        predicate: &dyn Fn(&ComponentDefinition) -> bool,
    ) -> Vec<Arc<ComponentDefinition>>;

    /// 定义数量
    fn definition_count(&self) -> usize;

    /// 清空注册表，包括别名
    fn clear(&self);
}
