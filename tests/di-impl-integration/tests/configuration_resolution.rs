//! 配置模块展开：工厂方法、显式导入、资源清单与占位符注入

use config_impl::{FileSystemResourceLoader, InMemoryResourceLoader, MapPropertySource};
use di_abstractions::{
    Arguments, ComponentContainer, ComponentContainerExt, ComponentDefinition, ComponentType,
    DefinitionRegistry, FactoryMethod, InjectionPoint, RegistryPostProcessor, TypeMetadataTable,
};
use di_impl::{ConfigurationProcessor, GenericDefinitionRegistry};
use infrastructure_common::{manifest_resource_name, DependencyError, TypeInfo};
use infrastructure_composition::ApplicationContext;
use std::sync::Arc;

struct X;

struct Y {
    x: Arc<X>,
}

#[derive(Default)]
struct AppModule;

fn y_type() -> ComponentType {
    ComponentType::builder::<Y>()
        .constructor(vec![InjectionPoint::component::<X>()], |args: &mut Arguments| {
            Ok(Y {
                x: args.component::<X>()?,
            })
        })
        .build()
}

/// 测试工厂方法组件与构造函数组件的端到端装配
#[test]
fn test_factory_method_and_constructor_end_to_end() {
    let module = ComponentType::builder::<AppModule>()
        .default_constructor()
        .bean(FactoryMethod::builder::<AppModule, X>("x").build(|_, _| Ok(X)))
        .import(Arc::new(y_type()))
        .build();

    let context = ApplicationContext::builder()
        .register_type(module)
        .build()
        .unwrap();
    context.refresh().unwrap();

    let y = context.require_bean::<Y>("y").unwrap();
    let x = context.require_bean::<X>("x").unwrap();
    assert!(Arc::ptr_eq(&y.x, &x));
}

#[derive(Default)]
struct SharedModule;

#[derive(Default)]
struct LeftModule;

#[derive(Default)]
struct RightModule;

struct Pool;

fn shared_module() -> Arc<ComponentType> {
    Arc::new(
        ComponentType::builder::<SharedModule>()
            .default_constructor()
            .bean(FactoryMethod::builder::<SharedModule, Pool>("pool").build(|_, _| Ok(Pool)))
            .build(),
    )
}

/// 测试被两个模块导入的模块只展开一次
#[test]
fn test_shared_module_expanded_once() {
    let shared = shared_module();
    let left = ComponentType::builder::<LeftModule>()
        .default_constructor()
        .import(shared.clone())
        .build();
    let right = ComponentType::builder::<RightModule>()
        .default_constructor()
        .import(shared)
        .build();

    let context = ApplicationContext::builder()
        .register_type(left)
        .register_type(right)
        .build()
        .unwrap();
    context.refresh().unwrap();

    let pools = context.get_beans_of_type::<Pool>().unwrap();
    assert_eq!(pools.len(), 1);
    assert_eq!(pools[0].0, "pool");
    assert!(context.contains_component("sharedModule"));
}

/// 测试直接调用展开两次时第二次不产生定义
#[test]
fn test_repeated_expansion_is_noop() {
    let registry = GenericDefinitionRegistry::new();
    registry
        .register_definition(ComponentDefinition::of_type(shared_module()))
        .unwrap();
    let module = registry.get_definition("sharedModule").unwrap();

    let processor = ConfigurationProcessor::new(None, Arc::new(TypeMetadataTable::new()));
    assert_eq!(processor.expand(&registry, &module).unwrap(), 1);
    assert_eq!(processor.expand(&registry, &module).unwrap(), 0);
    processor.post_process_registry(&registry).unwrap();
    assert_eq!(
        registry.definition_names(),
        vec!["sharedModule".to_string(), "pool".to_string()]
    );
}

#[derive(Default)]
struct ManifestModule;

#[derive(Default)]
struct Cache;

#[derive(Default)]
struct Metrics;

/// 测试通过内存资源清单导入组件
#[test]
fn test_manifest_import_from_memory() {
    let manifest = manifest_resource_name(&TypeInfo::of::<ManifestModule>());
    let content = format!(
        "# 导入的组件\n{}\n\n  app.Metrics  \n",
        TypeInfo::of::<Cache>().dotted_name()
    );
    let loader = InMemoryResourceLoader::new().with_text(manifest, content);

    let context = ApplicationContext::builder()
        .with_resource_loader(loader)
        .register_known_type(ComponentType::builder::<Cache>().default_constructor().build())
        .register_type_alias(
            "app::Metrics",
            ComponentType::builder::<Metrics>().default_constructor().build(),
        )
        .register_type(
            ComponentType::builder::<ManifestModule>()
                .default_constructor()
                .configuration()
                .build(),
        )
        .build()
        .unwrap();
    context.refresh().unwrap();

    assert_eq!(
        context.registry().definition_names()[..],
        [
            "manifestModule".to_string(),
            "environment".to_string(),
            "conversionService".to_string(),
            "eventPublisher".to_string(),
            "resourceLoader".to_string(),
            "cache".to_string(),
            "metrics".to_string(),
        ]
    );
    assert!(context.container().contains_singleton("metrics"));
}

/// 测试通过文件系统资源清单导入组件
#[test]
fn test_manifest_import_from_file_system() {
    let root = tempfile::tempdir().unwrap();
    let manifest = manifest_resource_name(&TypeInfo::of::<ManifestModule>());
    let path = root.path().join(&manifest);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "app.Cache\n").unwrap();

    let context = ApplicationContext::builder()
        .with_resource_loader(FileSystemResourceLoader::new(root.path()))
        .register_type_alias(
            "app.Cache",
            ComponentType::builder::<Cache>().default_constructor().build(),
        )
        .register_type(
            ComponentType::builder::<ManifestModule>()
                .default_constructor()
                .configuration()
                .build(),
        )
        .build()
        .unwrap();
    context.refresh().unwrap();

    assert!(context.require_bean::<Cache>("cache").is_ok());
}

/// 测试清单引用未登记的类型时刷新失败
#[test]
fn test_manifest_unknown_type_fails_refresh() {
    let manifest = manifest_resource_name(&TypeInfo::of::<ManifestModule>());
    let loader = InMemoryResourceLoader::new().with_text(manifest, "app.Unknown\n");
    let context = ApplicationContext::builder()
        .with_resource_loader(loader)
        .register_type(
            ComponentType::builder::<ManifestModule>()
                .default_constructor()
                .configuration()
                .build(),
        )
        .build()
        .unwrap();

    let err = context.refresh().unwrap_err();
    assert!(matches!(err, DependencyError::UnknownType { ref name } if name == "app.Unknown"));
}

struct Endpoint {
    host: String,
    port: u16,
    retries: Option<u8>,
}

/// 测试占位符按属性源顺序解析并转换为目标类型
#[test]
fn test_placeholder_injection_through_context() {
    let endpoint = ComponentType::builder::<Endpoint>()
        .constructor(
            vec![
                InjectionPoint::value::<String>("${endpoint.host:localhost}"),
                InjectionPoint::value::<u16>("${endpoint.port}"),
                InjectionPoint::value::<u8>("${endpoint.retries}").optional(),
            ],
            |args: &mut Arguments| {
                Ok(Endpoint {
                    host: args.value::<String>()?,
                    port: args.value::<u16>()?,
                    retries: args.optional_value::<u8>()?,
                })
            },
        )
        .build();

    let context = ApplicationContext::builder()
        .add_property_source(MapPropertySource::new("override", [("endpoint.port", "9090")]))
        .add_property_source(MapPropertySource::new(
            "defaults",
            [("endpoint.port", "80"), ("endpoint.host", "example.org")],
        ))
        .register_type(endpoint)
        .build()
        .unwrap();
    context.refresh().unwrap();

    let endpoint = context.require_bean::<Endpoint>("endpoint").unwrap();
    assert_eq!(endpoint.host, "example.org");
    assert_eq!(endpoint.port, 9090);
    assert_eq!(endpoint.retries, None);
}

/// 测试必需占位符缺失时刷新失败
#[test]
fn test_missing_required_placeholder_fails_refresh() {
    let endpoint = ComponentType::builder::<Endpoint>()
        .constructor(
            vec![InjectionPoint::value::<u16>("${endpoint.port}")],
            |args: &mut Arguments| {
                Ok(Endpoint {
                    host: String::new(),
                    port: args.value::<u16>()?,
                    retries: None,
                })
            },
        )
        .build();

    let context = ApplicationContext::builder()
        .register_type(endpoint)
        .build()
        .unwrap();
    assert!(matches!(
        context.refresh(),
        Err(DependencyError::NoSuchComponent { .. })
    ));
}

/// 测试无法转换的属性值
#[test]
fn test_unconvertible_placeholder_fails_refresh() {
    let endpoint = ComponentType::builder::<Endpoint>()
        .constructor(
            vec![InjectionPoint::value::<u16>("${endpoint.port}")],
            |args: &mut Arguments| {
                Ok(Endpoint {
                    host: String::new(),
                    port: args.value::<u16>()?,
                    retries: None,
                })
            },
        )
        .build();

    let context = ApplicationContext::builder()
        .add_property_source(MapPropertySource::new("test", [("endpoint.port", "http")]))
        .register_type(endpoint)
        .build()
        .unwrap();
    assert!(matches!(
        context.refresh(),
        Err(DependencyError::Conversion { .. })
    ));
}

#[derive(Default)]
struct RootModule;

/// 测试带组件名称的配置模块只有一个实例，两个名称都能取到
#[test]
fn test_named_configuration_module_is_single_instance() {
    let module = ComponentType::builder::<RootModule>()
        .default_constructor()
        .named("rootConfig")
        .bean(FactoryMethod::builder::<RootModule, X>("x").build(|_, _| Ok(X)))
        .build();

    let context = ApplicationContext::builder()
        .register_definition(ComponentDefinition::constructed("root", Arc::new(module)))
        .build()
        .unwrap();
    context.refresh().unwrap();

    let by_type = context.require_bean_of_type::<RootModule>().unwrap();
    let by_name = context.require_bean::<RootModule>("root").unwrap();
    let by_alias = context.require_bean::<RootModule>("rootConfig").unwrap();
    assert!(Arc::ptr_eq(&by_type, &by_name));
    assert!(Arc::ptr_eq(&by_name, &by_alias));
    assert_eq!(context.get_beans_of_type::<RootModule>().unwrap().len(), 1);
    assert!(context.contains_component("x"));
}
