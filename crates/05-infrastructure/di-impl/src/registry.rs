//! 定义注册表实现

use di_abstractions::{ComponentDefinition, DefinitionRegistry};
use infrastructure_common::{DependencyError, DependencyResult};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Default)]
struct RegistryState {
    order: Vec<String>,
    definitions: HashMap<String, Arc<ComponentDefinition>>,
    aliases: HashMap<String, String>,
    alias_order: Vec<String>,
}

impl RegistryState {
    fn canonical<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map_or(name, String::as_str)
    }

    fn is_taken(&self, name: &str) -> bool {
        self.definitions.contains_key(name) || self.aliases.contains_key(name)
    }
}

/// 通用定义注册表
///
/// 查询结果按注册顺序返回。别名只用于按名称查找，不参与按条件查询。
#[derive(Default)]
pub struct GenericDefinitionRegistry {
    state: RwLock<RegistryState>,
}

impl GenericDefinitionRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }
}

impl DefinitionRegistry for GenericDefinitionRegistry {
    fn register_definition(&self, definition: ComponentDefinition) -> DependencyResult<()> {
        let mut state = self.state.write();
        if state.is_taken(definition.name()) {
            return Err(DependencyError::Conflict {
                name: definition.name().to_string(),
            });
        }

        debug!(
            "注册组件定义: {} ({})",
            definition.name(),
            definition.type_info().short_name()
        );
        let name = definition.name().to_string();
        state.order.push(name.clone());
        state.definitions.insert(name, Arc::new(definition));
        Ok(())
    }

    fn remove_definition(&self, name: &str) -> Option<Arc<ComponentDefinition>> {
        let mut state = self.state.write();
        let removed = state.definitions.remove(name)?;
        state.order.retain(|n| n != name);
        let RegistryState {
            aliases,
            alias_order,
            ..
        } = &mut *state;
        aliases.retain(|_, target| target.as_str() != name);
        alias_order.retain(|alias| aliases.contains_key(alias));
        debug!("移除组件定义: {}", name);
        Some(removed)
    }

    fn register_alias(&self, name: &str, alias: &str) -> DependencyResult<()> {
        let mut state = self.state.write();
        if !state.definitions.contains_key(name) {
            return Err(DependencyError::no_such_component(name));
        }
        if state.is_taken(alias) {
            return Err(DependencyError::Conflict {
                name: alias.to_string(),
            });
        }

        debug!("登记组件别名: {} -> {}", alias, name);
        state.aliases.insert(alias.to_string(), name.to_string());
        state.alias_order.push(alias.to_string());
        Ok(())
    }

    fn aliases(&self, name: &str) -> Vec<String> {
        let state = self.state.read();
        state
            .alias_order
            .iter()
            .filter(|alias| state.aliases.get(*alias).is_some_and(|target| target == name))
            .cloned()
            .collect()
    }

    fn get_definition(&self, name: &str) -> Option<Arc<ComponentDefinition>> {
        let state = self.state.read();
        state.definitions.get(state.canonical(name)).cloned()
    }

    fn contains_definition(&self, name: &str) -> bool {
        self.state.read().is_taken(name)
    }

    fn definition_names(&self) -> Vec<String> {
        self.state.read().order.clone()
    }

    fn definitions_matching(
        &self,
        predicate: &dyn Fn(&ComponentDefinition) -> bool,
    ) -> Vec<Arc<ComponentDefinition>> {
        let snapshot: Vec<Arc<ComponentDefinition>> = {
            let state = self.state.read();
            state
                .order
                .iter()
                .filter_map(|name| state.definitions.get(name).cloned())
                .collect()
        };
        // 锁外求值，谓词可以再次访问注册表
        snapshot
            .into_iter()
            .filter(|definition| predicate(definition))
            .collect()
    }

    fn definition_count(&self) -> usize {
        self.state.read().order.len()
    }

    fn clear(&self) {
        let mut state = self.state.write();
        state.order.clear();
        state.definitions.clear();
        state.aliases.clear();
        state.alias_order.clear();
    }
}

impl std::fmt::Debug for GenericDefinitionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenericDefinitionRegistry")
            .field("definitions", &self.definition_names())
            .finish()
    }
}
