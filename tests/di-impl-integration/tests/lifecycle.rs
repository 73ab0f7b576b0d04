//! 刷新失败回滚、销毁顺序、能力注入与处理器组件

use config_abstractions::{Environment, ResourceLoader};
use config_impl::{InMemoryResourceLoader, MapPropertySource};
use di_abstractions::{
    Arguments, ComponentContainer, ComponentContainerExt, ComponentDefinition,
    ComponentPostProcessor, ComponentRef, ComponentType, ContainerAware, ConversionServiceExt,
    DisposableComponent, EnvironmentAware, InitializingComponent, InjectionPoint, NameAware,
    ResourceLoaderAware, TypeConverter, Value,
};
use di_impl::FromStrConverter;
use infrastructure_common::{ContextState, ConversionResult, DependencyError, DependencyResult, TypeInfo};
use infrastructure_composition::ApplicationContext;
use parking_lot::Mutex;
use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

type Journal = Arc<Mutex<Vec<String>>>;

struct Step {
    label: &'static str,
    journal: Journal,
}

impl DisposableComponent for Step {
    fn destroy(&self) -> anyhow::Result<()> {
        self.journal.lock().push(format!("destroy {}", self.label));
        Ok(())
    }
}

fn step(name: &'static str, journal: &Journal) -> ComponentDefinition {
    let journal = journal.clone();
    let ty = ComponentType::builder::<Step>()
        .constructor(Vec::new(), move |_| {
            journal.lock().push(format!("create {name}"));
            Ok(Step {
                label: name,
                journal: journal.clone(),
            })
        })
        .disposable()
        .build();
    ComponentDefinition::constructed(name, Arc::new(ty))
}

struct Faulty;

/// 测试刷新失败时按创建逆序销毁已创建的单例并返回原始错误
#[test]
fn test_failed_refresh_destroys_in_reverse_order() {
    let journal: Journal = Arc::new(Mutex::new(Vec::new()));
    let faulty = ComponentType::builder::<Faulty>()
        .constructor(Vec::new(), |_| anyhow::bail!("连接被拒绝"))
        .build();

    let context = ApplicationContext::builder()
        .register_definition(step("first", &journal))
        .register_definition(step("second", &journal))
        .register_type(faulty)
        .build()
        .unwrap();

    match context.refresh() {
        Err(DependencyError::ComponentCreationFailed { name, source }) => {
            assert_eq!(name, "Faulty");
            assert_eq!(source.to_string(), "连接被拒绝");
        }
        other => panic!("意外的结果: {other:?}"),
    }
    assert_eq!(context.state(), ContextState::Failed);
    assert_eq!(
        *journal.lock(),
        vec!["create first", "create second", "destroy second", "destroy first"]
    );
    assert_eq!(context.container().singleton_count(), 0);
}

/// 测试关闭上下文时销毁单例
#[test]
fn test_close_destroys_singletons() {
    let journal: Journal = Arc::new(Mutex::new(Vec::new()));
    let context = ApplicationContext::builder()
        .register_definition(step("first", &journal))
        .register_definition(step("second", &journal).with_depends_on("third"))
        .register_definition(step("third", &journal))
        .build()
        .unwrap();
    context.refresh().unwrap();
    assert!(context.is_active());

    context.close().unwrap();
    assert_eq!(
        *journal.lock(),
        vec![
            "create first",
            "create third",
            "create second",
            "destroy second",
            "destroy third",
            "destroy first",
        ]
    );
    assert!(matches!(
        context.get_component("first"),
        Err(DependencyError::IllegalState { .. })
    ));
}

#[derive(Default)]
struct Witness {
    name: String,
    container: Option<Weak<dyn ComponentContainer>>,
    environment: Option<Arc<dyn Environment>>,
    loader: Option<Arc<dyn ResourceLoader>>,
    ready_with_name: Option<String>,
}

impl NameAware for Witness {
    fn set_component_name(&mut self, name: &str) {
        self.name = name.to_string();
    }
}

impl ContainerAware for Witness {
    fn set_container(&mut self, container: Weak<dyn ComponentContainer>) {
        self.container = Some(container);
    }
}

impl EnvironmentAware for Witness {
    fn set_environment(&mut self, environment: Arc<dyn Environment>) {
        self.environment = Some(environment);
    }
}

impl ResourceLoaderAware for Witness {
    fn set_resource_loader(&mut self, loader: Arc<dyn ResourceLoader>) {
        self.loader = Some(loader);
    }
}

impl InitializingComponent for Witness {
    fn initialize(&mut self) -> anyhow::Result<()> {
        // 初始化回调在所有能力注入之后执行
        self.ready_with_name = Some(self.name.clone());
        Ok(())
    }
}

/// 测试能力注入在初始化回调之前完成
#[test]
fn test_capabilities_injected_before_initialization() {
    let witness = ComponentType::builder::<Witness>()
        .default_constructor()
        .named("witness")
        .name_aware()
        .container_aware()
        .environment_aware()
        .resource_loader_aware()
        .initializing()
        .build();

    let context = ApplicationContext::builder()
        .add_property_source(MapPropertySource::new("test", [("witness.enabled", "true")]))
        .with_resource_loader(InMemoryResourceLoader::new().with_text("witness.txt", "ok"))
        .register_type(witness)
        .build()
        .unwrap();
    context.refresh().unwrap();

    let witness = context.require_bean::<Witness>("witness").unwrap();
    assert_eq!(witness.name, "witness");
    assert_eq!(witness.ready_with_name.as_deref(), Some("witness"));

    let environment = witness.environment.as_ref().unwrap();
    assert_eq!(environment.get_property("witness.enabled").as_deref(), Some("true"));
    assert!(witness.loader.as_ref().unwrap().get_resource("witness.txt").exists());

    let container = witness.container.as_ref().unwrap().upgrade().unwrap();
    assert!(container.contains_component("witness"));
}

struct Reporter {
    sink: Option<Arc<Sink>>,
    level: u8,
}

#[derive(Default)]
struct Sink;

/// 测试字段注入组件与占位符值
#[test]
fn test_field_injection() {
    let reporter = ComponentType::builder::<Reporter>()
        .constructor(Vec::new(), |_| Ok(Reporter { sink: None, level: 0 }))
        .inject_component::<Sink>("sink", InjectionPoint::component::<Sink>(), |r, sink| {
            r.sink = Some(sink)
        })
        .inject_value::<u8>("level", InjectionPoint::value::<u8>("${report.level:3}"), |r, level| {
            r.level = level
        })
        .build();

    let context = ApplicationContext::builder()
        .register_type(ComponentType::builder::<Sink>().default_constructor().build())
        .register_type(reporter)
        .build()
        .unwrap();
    context.refresh().unwrap();

    let reporter = context.require_bean::<Reporter>("reporter").unwrap();
    let sink = context.require_bean::<Sink>("sink").unwrap();
    assert!(Arc::ptr_eq(reporter.sink.as_ref().unwrap(), &sink));
    assert_eq!(reporter.level, 3);
}

#[derive(Debug, PartialEq)]
struct Percent(u8);

#[derive(Default)]
struct PercentConverter;

impl TypeConverter for PercentConverter {
    fn target_type(&self) -> TypeInfo {
        TypeInfo::of::<Percent>()
    }

    fn supports(&self, source: &TypeInfo) -> bool {
        source.is::<String>()
    }

    fn convert(&self, value: &(dyn Any + Send + Sync)) -> ConversionResult<Value> {
        let text = value.downcast_ref::<String>().map(String::as_str).unwrap_or_default();
        let digits = text.trim().trim_end_matches('%');
        digits
            .parse::<u8>()
            .map(|n| Box::new(Percent(n)) as Value)
            .map_err(|e| infrastructure_common::ConversionError::failed(text, "Percent", e.to_string()))
    }
}

struct Throttle {
    limit: Percent,
}

/// 测试转换器组件被自动登记并用于占位符转换
#[test]
fn test_converter_component_registered() {
    let throttle = ComponentType::builder::<Throttle>()
        .constructor(
            vec![InjectionPoint::value::<Percent>("${throttle.limit}")],
            |args: &mut Arguments| {
                Ok(Throttle {
                    limit: args.value::<Percent>()?,
                })
            },
        )
        .depends_on("percentConverter")
        .build();

    let context = ApplicationContext::builder()
        .add_property_source(MapPropertySource::new("test", [("throttle.limit", "75%")]))
        .register_type(throttle)
        .register_type(
            ComponentType::builder::<PercentConverter>()
                .default_constructor()
                .converter()
                .build(),
        )
        .build()
        .unwrap();
    context.refresh().unwrap();

    assert_eq!(context.require_bean::<Throttle>("throttle").unwrap().limit, Percent(75));
    assert_eq!(
        context
            .conversion_service()
            .convert::<String, Percent>("10%".to_string())
            .unwrap(),
        Percent(10)
    );
}

/// 测试手动添加的转换器
#[test]
fn test_builder_converter() {
    #[derive(Debug, PartialEq)]
    struct Port(u16);

    impl std::str::FromStr for Port {
        type Err = std::num::ParseIntError;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            s.parse().map(Port)
        }
    }

    let context = ApplicationContext::builder()
        .add_converter(Arc::new(FromStrConverter::<Port>::new()))
        .build()
        .unwrap();
    let service = context.conversion_service();
    assert!(service.can_convert::<String, Port>());
    assert_eq!(service.convert::<&'static str, Port>("8080").unwrap(), Port(8080));
}

struct Counting {
    seen: Arc<AtomicUsize>,
}

impl ComponentPostProcessor for Counting {
    fn name(&self) -> &str {
        "Counting"
    }

    fn after_initialization(
        &self,
        _definition: &ComponentDefinition,
        instance: ComponentRef,
        _container: &dyn ComponentContainer,
    ) -> DependencyResult<ComponentRef> {
        self.seen.fetch_add(1, Ordering::SeqCst);
        Ok(instance)
    }
}

#[derive(Default)]
struct Worker;

/// 测试后处理器组件在实例化阶段之前挂载
#[test]
fn test_post_processor_component_applies_to_later_singletons() {
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = seen.clone();
    let counting = ComponentType::builder::<Counting>()
        .constructor(Vec::new(), move |_| Ok(Counting { seen: counter.clone() }))
        .post_processor()
        .build();

    let context = ApplicationContext::builder()
        .register_type(counting)
        .register_type(ComponentType::builder::<Worker>().default_constructor().build())
        .register_definition(
            ComponentDefinition::of_type(Arc::new(
                ComponentType::builder::<Sink>().default_constructor().build(),
            ))
            .with_lazy(true),
        )
        .build()
        .unwrap();
    context.refresh().unwrap();
    assert_eq!(seen.load(Ordering::SeqCst), 1);

    context.require_bean::<Sink>("sink").unwrap();
    assert_eq!(seen.load(Ordering::SeqCst), 2);
}
