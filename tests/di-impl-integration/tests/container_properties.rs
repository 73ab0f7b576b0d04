//! 组件容器的核心性质：名称唯一、单例同一、循环检测、首选裁决与并发创建

use di_abstractions::{
    Arguments, ComponentContainer, ComponentContainerExt, ComponentDefinition, ComponentType,
    DefinitionRegistry, InjectionPoint,
};
use di_impl::{GenericComponentContainer, GenericConversionService, GenericDefinitionRegistry};
use infrastructure_common::{DependencyError, Scope};
use infrastructure_composition::ApplicationContext;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn container() -> GenericComponentContainer {
    GenericComponentContainer::new(Arc::new(GenericConversionService::with_defaults()))
}

trait Codec: Send + Sync {
    fn id(&self) -> &'static str;
}

#[derive(Default)]
struct Gzip;

impl Codec for Gzip {
    fn id(&self) -> &'static str {
        "gzip"
    }
}

#[derive(Default)]
struct Zstd;

impl Codec for Zstd {
    fn id(&self) -> &'static str {
        "zstd"
    }
}

fn codec<C: Codec + Default + 'static>() -> ComponentType {
    ComponentType::builder::<C>()
        .default_constructor()
        .provides::<dyn Codec>(|c| c)
        .build()
}

/// 测试重复名称注册失败且注册表保持不变
#[test]
fn test_duplicate_registration_leaves_registry_unchanged() {
    let registry = GenericDefinitionRegistry::new();
    registry
        .register_definition(ComponentDefinition::constructed("codec", Arc::new(codec::<Gzip>())))
        .unwrap();
    let before = registry.get_definition("codec").unwrap();

    let err = registry
        .register_definition(ComponentDefinition::constructed("codec", Arc::new(codec::<Zstd>())))
        .unwrap_err();
    assert!(matches!(err, DependencyError::Conflict { ref name } if name == "codec"));

    let after = registry.get_definition("codec").unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert!(after.type_info().is::<Gzip>());
    assert_eq!(registry.definition_names(), vec!["codec".to_string()]);
}

/// 测试单例每次返回同一实例，原型每次返回新实例
#[test]
fn test_singleton_identity_and_prototype_freshness() {
    let context = ApplicationContext::builder()
        .register_type(codec::<Gzip>())
        .register_definition(
            ComponentDefinition::of_type(Arc::new(codec::<Zstd>())).with_scope(Scope::Prototype),
        )
        .build()
        .unwrap();
    context.refresh().unwrap();

    let first = context.require_bean::<Gzip>("gzip").unwrap();
    let second = context.require_bean::<Gzip>("gzip").unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let first = context.require_bean::<Zstd>("zstd").unwrap();
    let second = context.require_bean::<Zstd>("zstd").unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert!(!context.container().contains_singleton("zstd"));
}

struct Alpha {
    _beta: Arc<Beta>,
}

struct Beta {
    _alpha: Arc<Alpha>,
}

/// 测试两个单例互相依赖时报告循环创建
#[test]
fn test_mutual_dependency_reports_cycle() {
    let container = container();
    let alpha = ComponentType::builder::<Alpha>()
        .constructor(vec![InjectionPoint::component::<Beta>()], |args: &mut Arguments| {
            Ok(Alpha {
                _beta: args.component::<Beta>()?,
            })
        })
        .build();
    let beta = ComponentType::builder::<Beta>()
        .constructor(vec![InjectionPoint::component::<Alpha>()], |args: &mut Arguments| {
            Ok(Beta {
                _alpha: args.component::<Alpha>()?,
            })
        })
        .build();
    container
        .register_definition(ComponentDefinition::of_type(Arc::new(alpha)))
        .unwrap();
    container
        .register_definition(ComponentDefinition::of_type(Arc::new(beta)))
        .unwrap();

    match container.get_component("alpha") {
        Err(DependencyError::CircularCreation { name, chain }) => {
            assert_eq!(name, "alpha");
            assert_eq!(chain, "alpha -> beta -> alpha");
        }
        Err(other) => panic!("意外的错误: {other}"),
        Ok(_) => panic!("循环依赖没有被检测到"),
    }
    assert_eq!(container.singleton_count(), 0);
}

/// 测试刷新时的循环依赖使刷新失败
#[test]
fn test_cycle_fails_refresh() {
    let alpha = ComponentType::builder::<Alpha>()
        .constructor(vec![InjectionPoint::component::<Beta>()], |args: &mut Arguments| {
            Ok(Alpha {
                _beta: args.component::<Beta>()?,
            })
        })
        .build();
    let beta = ComponentType::builder::<Beta>()
        .constructor(vec![InjectionPoint::component::<Alpha>()], |args: &mut Arguments| {
            Ok(Beta {
                _alpha: args.component::<Alpha>()?,
            })
        })
        .build();
    let context = ApplicationContext::builder()
        .register_type(alpha)
        .register_type(beta)
        .build()
        .unwrap();

    let err = context.refresh().unwrap_err();
    assert!(err.is_circular(), "{err}");
}

/// 测试首选组件裁决
#[test]
fn test_primary_resolves_ambiguity() {
    let ambiguous = ApplicationContext::builder()
        .register_type(codec::<Gzip>())
        .register_type(codec::<Zstd>())
        .build()
        .unwrap();
    ambiguous.refresh().unwrap();
    match ambiguous.get_bean_of_type::<dyn Codec>() {
        Err(DependencyError::AmbiguousComponent { candidates, .. }) => {
            assert_eq!(candidates, vec!["gzip".to_string(), "zstd".to_string()]);
        }
        Err(other) => panic!("意外的错误: {other}"),
        Ok(_) => panic!("应当因为多个候选而失败"),
    }

    let resolved = ApplicationContext::builder()
        .register_type(codec::<Gzip>())
        .register_definition(ComponentDefinition::of_type(Arc::new(codec::<Zstd>())).with_primary(true))
        .build()
        .unwrap();
    resolved.refresh().unwrap();
    let chosen = resolved.require_bean_of_type::<dyn Codec>().unwrap();
    assert_eq!(chosen.id(), "zstd");

    let all = resolved.get_beans_of_type::<dyn Codec>().unwrap();
    let ids: Vec<&str> = all.iter().map(|(_, codec)| codec.id()).collect();
    assert_eq!(ids, vec!["gzip", "zstd"]);
}

/// 测试多个首选组件时仍报告不唯一
#[test]
fn test_multiple_primaries_are_ambiguous() {
    let context = ApplicationContext::builder()
        .register_definition(
            ComponentDefinition::constructed("a", Arc::new(codec::<Gzip>())).with_primary(true),
        )
        .register_definition(
            ComponentDefinition::constructed("b", Arc::new(codec::<Zstd>())).with_primary(true),
        )
        .build()
        .unwrap();
    context.refresh().unwrap();

    match context.get_bean_of_type::<dyn Codec>() {
        Err(DependencyError::AmbiguousComponent { candidates, .. }) => {
            assert_eq!(candidates, vec!["a".to_string(), "b".to_string()]);
        }
        Err(other) => panic!("意外的错误: {other}"),
        Ok(_) => panic!("两个首选组件应当报告不唯一"),
    }
    assert!(matches!(
        context.require_bean_of_type::<dyn Codec>(),
        Err(DependencyError::AmbiguousComponent { .. })
    ));
}

/// 测试按类型查找名称
#[test]
fn test_names_for_type() {
    let context = ApplicationContext::builder()
        .register_definition(ComponentDefinition::of_type(Arc::new(codec::<Gzip>())).with_lazy(true))
        .register_definition(
            ComponentDefinition::of_type(Arc::new(codec::<Zstd>())).with_scope(Scope::Prototype),
        )
        .build()
        .unwrap();
    context.refresh().unwrap();
    assert!(!context.container().contains_singleton("gzip"));

    let singletons = context.get_bean_names_for_type::<dyn Codec>(false, false).unwrap();
    assert_eq!(singletons, vec!["gzip".to_string()]);
    assert!(!context.container().contains_singleton("gzip"));

    let all = context.get_bean_names_for_type::<dyn Codec>(true, true).unwrap();
    assert_eq!(all, vec!["gzip".to_string(), "zstd".to_string()]);
    assert!(context.container().contains_singleton("gzip"));
}

struct Slow;

/// 测试多线程同时请求同一单例时只构造一次
#[test]
fn test_concurrent_requests_construct_once() {
    let constructed = Arc::new(AtomicUsize::new(0));
    let counter = constructed.clone();
    let slow = ComponentType::builder::<Slow>()
        .constructor(Vec::new(), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(20));
            Ok(Slow)
        })
        .lazy()
        .build();

    let container = container();
    container
        .register_definition(ComponentDefinition::of_type(Arc::new(slow)))
        .unwrap();

    let instances: Vec<Arc<Slow>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| container.require_bean::<Slow>("slow").unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(constructed.load(Ordering::SeqCst), 1);
    assert!(instances.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
}

/// 测试查找不存在的组件
#[test]
fn test_missing_component() {
    let context = ApplicationContext::builder().build().unwrap();
    context.refresh().unwrap();

    assert!(context.get_component("nothing").unwrap().is_none());
    assert!(context.get_bean_of_type::<dyn Codec>().unwrap().is_none());
    assert!(matches!(
        context.require_bean_of_type::<dyn Codec>(),
        Err(DependencyError::NoSuchComponent { .. })
    ));
}
