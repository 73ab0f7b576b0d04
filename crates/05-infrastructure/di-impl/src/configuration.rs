//! 配置模块解析
//!
//! 配置模块依次交给四个解析器：直接组件、工厂方法、显式导入、资源清单。
//! 新产出的定义如果本身是配置模块，会在进入下一个解析器之前立即展开。
//! 每个模块在容器生命周期内最多展开一次。

use config_abstractions::ResourceLoader;
use di_abstractions::{
    ComponentDefinition, ConfigurationResolver, DefinitionRegistry, RegistryPostProcessor,
    TypeMetadataTable,
};
use infrastructure_common::{manifest_resource_name, DependencyError, DependencyResult};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// 配置处理器优先级，先于所有其他注册表后处理器
pub const CONFIGURATION_PROCESSOR_PRIORITY: i32 = i32::MIN;

/// 直接组件解析器
///
/// 配置模块同时带有组件标记且标记名称与模块定义名称不同时，
/// 把标记名称登记为模块定义的别名，两个名称取到同一个实例。
#[derive(Debug, Default)]
pub struct DirectComponentResolver;

impl DirectComponentResolver {
    fn marker_name(module: &ComponentDefinition) -> Option<&str> {
        module
            .metadata()
            .component_marker()
            .and_then(|marker| marker.name.as_deref())
            .filter(|name| *name != module.name())
    }
}

impl ConfigurationResolver for DirectComponentResolver {
    fn name(&self) -> &str {
        "DirectComponentResolver"
    }

    fn supports(&self, module: &ComponentDefinition) -> bool {
        Self::marker_name(module).is_some()
    }

    fn resolve(&self, _module: &ComponentDefinition) -> DependencyResult<Vec<ComponentDefinition>> {
        Ok(Vec::new())
    }

    fn aliases(&self, module: &ComponentDefinition) -> Vec<String> {
        Self::marker_name(module).map(str::to_string).into_iter().collect()
    }
}

/// 工厂方法解析器
#[derive(Debug, Default)]
pub struct FactoryMethodResolver;

impl ConfigurationResolver for FactoryMethodResolver {
    fn name(&self) -> &str {
        "FactoryMethodResolver"
    }

    fn supports(&self, module: &ComponentDefinition) -> bool {
        module
            .metadata()
            .configuration()
            .is_some_and(|c| !c.factory_methods.is_empty())
    }

    fn resolve(&self, module: &ComponentDefinition) -> DependencyResult<Vec<ComponentDefinition>> {
        let Some(configuration) = module.metadata().configuration() else {
            return Ok(Vec::new());
        };
        Ok(configuration
            .factory_methods
            .iter()
            .map(|method| ComponentDefinition::for_method(module.name(), method.clone()))
            .collect())
    }
}

/// 显式导入解析器
#[derive(Debug, Default)]
pub struct ExplicitImportResolver;

impl ConfigurationResolver for ExplicitImportResolver {
    fn name(&self) -> &str {
        "ExplicitImportResolver"
    }

    fn supports(&self, module: &ComponentDefinition) -> bool {
        module
            .metadata()
            .configuration()
            .is_some_and(|c| !c.imports.is_empty())
    }

    fn resolve(&self, module: &ComponentDefinition) -> DependencyResult<Vec<ComponentDefinition>> {
        let Some(configuration) = module.metadata().configuration() else {
            return Ok(Vec::new());
        };
        Ok(configuration
            .imports
            .iter()
            .map(|ty| ComponentDefinition::of_type(ty.clone()))
            .collect())
    }
}

/// 资源清单解析器
///
/// 读取 `components/{模块完整类型名}.imports`，每行一个类型名，
/// 空行与 `#` 开头的行忽略，类型名通过元数据表查找。
pub struct ResourceManifestResolver {
    loader: Option<Arc<dyn ResourceLoader>>,
    table: Arc<TypeMetadataTable>,
}

impl ResourceManifestResolver {
    /// 创建解析器，未提供资源加载器时不生效
    pub fn new(loader: Option<Arc<dyn ResourceLoader>>, table: Arc<TypeMetadataTable>) -> Self {
        Self { loader, table }
    }
}

impl ConfigurationResolver for ResourceManifestResolver {
    fn name(&self) -> &str {
        "ResourceManifestResolver"
    }

    fn supports(&self, module: &ComponentDefinition) -> bool {
        self.loader.is_some() && module.is_configuration()
    }

    fn resolve(&self, module: &ComponentDefinition) -> DependencyResult<Vec<ComponentDefinition>> {
        let Some(loader) = &self.loader else {
            return Ok(Vec::new());
        };

        let resource_name = manifest_resource_name(&module.type_info());
        let resource = loader.get_resource(&resource_name);
        if !resource.exists() {
            return Ok(Vec::new());
        }

        debug!("读取组件清单: {}", resource_name);
        let mut definitions = Vec::new();
        for line in resource.read_lines()? {
            let entry = line.trim();
            if entry.is_empty() || entry.starts_with('#') {
                continue;
            }
            let component_type = self
                .table
                .get(entry)
                .ok_or_else(|| DependencyError::UnknownType {
                    name: entry.to_string(),
                })?;
            definitions.push(ComponentDefinition::of_type(component_type));
        }
        Ok(definitions)
    }
}

/// 配置处理器
///
/// 作为注册表后处理器运行，把注册表中的所有配置模块展开。
pub struct ConfigurationProcessor {
    resolvers: Vec<Box<dyn ConfigurationResolver>>,
    expanded: Mutex<HashSet<String>>,
}

impl ConfigurationProcessor {
    /// 使用四个内置解析器创建处理器
    pub fn new(loader: Option<Arc<dyn ResourceLoader>>, table: Arc<TypeMetadataTable>) -> Self {
        Self::with_resolvers(vec![
            Box::new(DirectComponentResolver),
            Box::new(FactoryMethodResolver),
            Box::new(ExplicitImportResolver),
            Box::new(ResourceManifestResolver::new(loader, table)),
        ])
    }

    /// 使用自定义解析器列表创建处理器，按列表顺序执行
    pub fn with_resolvers(resolvers: Vec<Box<dyn ConfigurationResolver>>) -> Self {
        Self {
            resolvers,
            expanded: Mutex::new(HashSet::new()),
        }
    }

    /// 模块是否已展开
    pub fn is_expanded(&self, name: &str) -> bool {
        self.expanded.lock().contains(name)
    }

    /// 展开一个配置模块，返回新注册的定义数量
    ///
    /// 已展开的模块直接返回 0。产出的名称已被同类型定义占用时跳过，
    /// 被不同类型占用时返回 `Conflict`。
    pub fn expand(
        &self,
        registry: &dyn DefinitionRegistry,
        module: &ComponentDefinition,
    ) -> DependencyResult<usize> {
        if !self.expanded.lock().insert(module.name().to_string()) {
            debug!("配置模块 {} 已展开，跳过", module.name());
            return Ok(0);
        }

        info!("展开配置模块: {}", module.name());
        let mut added = 0;
        for resolver in &self.resolvers {
            if !resolver.supports(module) {
                continue;
            }

            for alias in resolver.aliases(module) {
                match registry.get_definition(&alias) {
                    Some(existing) if existing.name() == module.name() => {}
                    Some(existing) if existing.type_info() != module.type_info() => {
                        return Err(DependencyError::Conflict { name: alias });
                    }
                    Some(_) => debug!("{}: 名称 {} 已注册，跳过", resolver.name(), alias),
                    None => {
                        registry.register_alias(module.name(), &alias)?;
                        debug!("{}: 登记别名 {} -> {}", resolver.name(), alias, module.name());
                    }
                }
            }

            for definition in resolver.resolve(module)? {
                let name = definition.name().to_string();
                if let Some(existing) = registry.get_definition(&name) {
                    if existing.type_info() != definition.type_info() {
                        return Err(DependencyError::Conflict { name });
                    }
                    debug!("{}: 组件 {} 已注册，跳过", resolver.name(), name);
                    if existing.is_configuration() {
                        added += self.expand(registry, &existing)?;
                    }
                    continue;
                }

                registry.register_definition(definition)?;
                added += 1;
                debug!("{}: 注册组件 {}", resolver.name(), name);

                if let Some(registered) = registry.get_definition(&name) {
                    if registered.is_configuration() {
                        added += self.expand(registry, &registered)?;
                    }
                }
            }
        }
        Ok(added)
    }
}

impl RegistryPostProcessor for ConfigurationProcessor {
    fn name(&self) -> &str {
        "ConfigurationProcessor"
    }

    fn priority(&self) -> Option<i32> {
        Some(CONFIGURATION_PROCESSOR_PRIORITY)
    }

    fn post_process_registry(&self, registry: &dyn DefinitionRegistry) -> DependencyResult<()> {
        let mut total = 0;
        loop {
            let pending = registry
                .definitions_matching(&|d: &ComponentDefinition| {
                    d.is_configuration() && !self.is_expanded(d.name())
                });
            if pending.is_empty() {
                break;
            }
            for module in &pending {
                total += self.expand(registry, module)?;
            }
        }
        info!("配置解析完成，新增 {} 个组件定义", total);
        Ok(())
    }
}

impl std::fmt::Debug for ConfigurationProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let resolvers: Vec<&str> = self.resolvers.iter().map(|r| r.name()).collect();
        f.debug_struct("ConfigurationProcessor")
            .field("resolvers", &resolvers)
            .field("expanded", &self.expanded.lock().len())
            .finish()
    }
}
