//! 应用上下文构建器

use crate::context::ApplicationContext;
use config_abstractions::{PropertySource, ResourceLoader};
use config_impl::{
    EnvironmentVariablePropertySource, JsonPropertySource, StandardEnvironment, TomlPropertySource,
};
use di_abstractions::{
    ComponentDefinition, ComponentPostProcessor, ComponentRef, ComponentType, ConversionService,
    RegistryPostProcessor, TypeConverter, TypeMetadataTable,
};
use di_impl::{GenericComponentContainer, GenericConversionService};
use infrastructure_common::{InfrastructureError, InfrastructureResult};
use std::any::Any;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// 应用上下文构建器
///
/// 配置源按添加顺序排列，先添加的优先。
pub struct ApplicationContextBuilder {
    environment: Arc<StandardEnvironment>,
    resource_loader: Option<Arc<dyn ResourceLoader>>,
    metadata_table: Arc<TypeMetadataTable>,
    conversion_service: Arc<GenericConversionService>,
    definitions: Vec<ComponentDefinition>,
    singletons: Vec<(String, ComponentRef, Arc<ComponentType>)>,
    post_processors: Vec<Arc<dyn ComponentPostProcessor>>,
    registry_processors: Vec<Arc<dyn RegistryPostProcessor>>,
    /// 是否启用日志初始化
    logging_enabled: bool,
    /// 日志配置
    logging_config: LoggingConfig,
}

impl ApplicationContextBuilder {
    /// 创建新的构建器，转换服务预置基础类型转换器
    pub fn new() -> Self {
        Self {
            environment: Arc::new(StandardEnvironment::new()),
            resource_loader: None,
            metadata_table: Arc::new(TypeMetadataTable::new()),
            conversion_service: Arc::new(GenericConversionService::with_defaults()),
            definitions: Vec::new(),
            singletons: Vec::new(),
            post_processors: Vec::new(),
            registry_processors: Vec::new(),
            logging_enabled: false, // 默认不启用日志初始化
            logging_config: LoggingConfig::default(),
        }
    }

    /// 添加 TOML 配置文件
    pub fn add_config_toml<P: AsRef<Path>>(self, path: P) -> InfrastructureResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InfrastructureError::BootstrapFailed {
                message: format!("配置文件不存在: {}", path.display()),
            });
        }

        info!("添加 TOML 配置文件: {}", path.display());
        let source = TomlPropertySource::from_file(path)?;
        Ok(self.add_property_source(source))
    }

    /// 添加 JSON 配置文件
    pub fn add_config_json<P: AsRef<Path>>(self, path: P) -> InfrastructureResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InfrastructureError::BootstrapFailed {
                message: format!("配置文件不存在: {}", path.display()),
            });
        }

        info!("添加 JSON 配置文件: {}", path.display());
        let source = JsonPropertySource::from_file(path)?;
        Ok(self.add_property_source(source))
    }

    /// 添加环境变量配置源
    pub fn add_config_env_vars<S: Into<String>>(self, prefix: S) -> Self {
        let prefix = prefix.into();
        info!("添加环境变量配置源，前缀: {}", prefix);
        self.add_property_source(EnvironmentVariablePropertySource::new(prefix))
    }

    /// 添加自定义属性源
    pub fn add_property_source<T: PropertySource + 'static>(self, source: T) -> Self {
        debug!("添加属性源: {}", source.name());
        self.environment.add_last(Arc::new(source));
        self
    }

    /// 设置资源加载器，供清单解析与资源感知组件使用
    pub fn with_resource_loader<T: ResourceLoader + 'static>(mut self, loader: T) -> Self {
        self.resource_loader = Some(Arc::new(loader));
        self
    }

    /// 添加类型转换器
    pub fn add_converter(self, converter: Arc<dyn TypeConverter>) -> Self {
        self.conversion_service.register(converter);
        self
    }

    /// 按类型元数据注册组件，同时登记到类型元数据表
    pub fn register_type(mut self, component_type: impl Into<Arc<ComponentType>>) -> Self {
        let component_type = component_type.into();
        self.metadata_table.register(component_type.clone());
        self.definitions
            .push(ComponentDefinition::of_type(component_type));
        self
    }

    /// 只登记类型元数据，供资源清单按名称导入
    pub fn register_known_type(self, component_type: impl Into<Arc<ComponentType>>) -> Self {
        self.metadata_table.register(component_type.into());
        self
    }

    /// 以别名登记类型元数据
    pub fn register_type_alias(
        self,
        alias: impl AsRef<str>,
        component_type: impl Into<Arc<ComponentType>>,
    ) -> Self {
        self.metadata_table
            .register_alias(alias, component_type.into());
        self
    }

    /// 注册组件定义
    pub fn register_definition(mut self, definition: ComponentDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    /// 注册预先构建的单例
    pub fn register_singleton<T: Any + Send + Sync>(
        mut self,
        name: impl Into<String>,
        instance: Arc<T>,
    ) -> Self {
        let instance: ComponentRef = instance;
        self.singletons
            .push((name.into(), instance, Arc::new(ComponentType::of::<T>())));
        self
    }

    /// 添加组件后处理器
    pub fn add_post_processor<T: ComponentPostProcessor + 'static>(mut self, processor: T) -> Self {
        self.post_processors.push(Arc::new(processor));
        self
    }

    /// 添加注册表后处理器
    pub fn add_registry_processor<T: RegistryPostProcessor + 'static>(
        mut self,
        processor: T,
    ) -> Self {
        self.registry_processors.push(Arc::new(processor));
        self
    }

    /// 配置日志
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = config;
        self.logging_enabled = true; // 启用日志初始化
        self
    }

    /// 构建应用上下文，尚未刷新
    pub fn build(self) -> InfrastructureResult<ApplicationContext> {
        // 只有在明确配置了日志时才初始化日志
        // 避免在测试环境中重复初始化
        if self.logging_enabled {
            self.initialize_logging()?;
        }

        info!("开始构建应用上下文");
        let conversion_service: Arc<dyn ConversionService> = self.conversion_service;
        let container = Arc::new(GenericComponentContainer::new(conversion_service));

        for definition in self.definitions {
            container.register_definition(definition)?;
        }
        for (name, instance, metadata) in self.singletons {
            container.register_singleton_with(name, instance, metadata)?;
        }
        for processor in self.post_processors {
            container.add_post_processor(processor);
        }

        info!(
            "应用上下文构建完成，{} 个组件定义，{} 个属性源",
            container.registry().definition_count(),
            self.environment.source_names().len()
        );
        Ok(ApplicationContext::new(
            container,
            self.environment,
            self.resource_loader,
            self.metadata_table,
            self.registry_processors,
        ))
    }

    /// 初始化日志系统
    fn initialize_logging(&self) -> InfrastructureResult<()> {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(self.logging_config.level)
            .with_target(self.logging_config.show_target)
            .with_thread_ids(self.logging_config.show_thread_ids)
            .with_file(self.logging_config.show_file)
            .with_line_number(self.logging_config.show_line_number);

        if self.logging_config.json_format {
            subscriber.json().try_init()
        } else {
            subscriber.try_init()
        }
        .map_err(|e| InfrastructureError::BootstrapFailed {
            message: format!("日志初始化失败: {}", e),
        })?;

        info!("日志系统初始化完成");
        Ok(())
    }
}

impl Default for ApplicationContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: tracing::Level,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否显示文件名
    pub show_file: bool,
    /// 是否显示行号
    pub show_line_number: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 创建开发环境日志配置
    pub fn development() -> Self {
        Self {
            level: tracing::Level::DEBUG,
            show_target: true,
            show_thread_ids: true,
            show_file: true,
            show_line_number: true,
            json_format: false,
        }
    }

    /// 创建生产环境日志配置
    pub fn production() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: false,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: true,
        }
    }
}
