use managed_di::{Constructor, DiError, Nominal, Parameter, ProviderKind, Registry, RegistryConfig};

struct ServiceA;
struct ServiceB;
struct ServiceC;
struct SelfReferencing;
struct Standalone;

fn record_needing<T: Send + Sync + 'static, D: 'static>(value: fn() -> T) -> Constructor {
    Constructor::record(Nominal::of::<T>())
        .field("dep", Nominal::of::<D>())
        .build(move |_| Ok(value()))
}

fn cyclic_registry(config: RegistryConfig) -> Registry {
    let mut registry = Registry::with_config(config);
    registry
        .register_constructor(record_needing::<ServiceA, ServiceB>(|| ServiceA), ProviderKind::Singleton)
        .unwrap()
        .register_constructor(record_needing::<ServiceB, ServiceC>(|| ServiceB), ProviderKind::Singleton)
        .unwrap()
        .register_constructor(record_needing::<ServiceC, ServiceA>(|| ServiceC), ProviderKind::Factory)
        .unwrap()
        .register_constructor(
            Constructor::record(Nominal::of::<Standalone>()).build(|_| Ok(Standalone)),
            ProviderKind::Singleton,
        )
        .unwrap();
    registry
}

#[test]
fn test_self_circular_dependency() {
    let mut registry = Registry::new();
    registry
        .register_constructor(
            Constructor::class(Nominal::of::<SelfReferencing>())
                .param(Parameter::positional("me", Nominal::of::<SelfReferencing>()))
                .build(|_| Ok(SelfReferencing)),
            ProviderKind::Factory,
        )
        .unwrap();

    match registry.get::<SelfReferencing>() {
        Err(DiError::Circular(path)) => assert_eq!(path, vec!["SelfReferencing", "SelfReferencing"]),
        other => panic!("Expected circular dependency error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_three_way_circular_dependency() {
    let registry = cyclic_registry(RegistryConfig::default());

    match registry.get::<ServiceA>() {
        Err(DiError::Circular(path)) => {
            assert_eq!(path, vec!["ServiceA", "ServiceB", "ServiceC", "ServiceA"]);
        }
        other => panic!("Expected circular dependency error, got {:?}", other.map(|_| ())),
    }

    // The path starts wherever resolution entered the cycle
    match registry.get::<ServiceB>() {
        Err(DiError::Circular(path)) => {
            assert_eq!(path, vec!["ServiceB", "ServiceC", "ServiceA", "ServiceB"]);
        }
        other => panic!("Expected circular dependency error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_registry_usable_after_cycle() {
    let registry = cyclic_registry(RegistryConfig::default());
    assert!(registry.get::<ServiceA>().is_err());
    assert!(registry.get::<Standalone>().is_ok());
    // Failing again gives the same error rather than a stale stack
    assert!(matches!(registry.get::<ServiceA>(), Err(DiError::Circular(_))));
}

#[test]
fn test_depth_limit_without_cycle_detection() {
    let config = RegistryConfig { max_depth: 16, detect_cycles: false, ..RegistryConfig::default() };
    let registry = cyclic_registry(config);

    assert_eq!(registry.get::<ServiceA>().err(), Some(DiError::DepthExceeded(16)));
    assert!(registry.get::<Standalone>().is_ok());
}

#[test]
fn test_default_depth_limit_without_cycle_detection() {
    struct Loop;

    let config = RegistryConfig { detect_cycles: false, ..RegistryConfig::default() };
    let max_depth = config.max_depth;
    let mut registry = Registry::with_config(config);
    registry
        .register_constructor(
            Constructor::class(Nominal::of::<Loop>())
                .param(Parameter::positional("next", Nominal::of::<Loop>()))
                .build(|_| Ok(Loop)),
            ProviderKind::Factory,
        )
        .unwrap();

    assert_eq!(registry.get::<Loop>().err(), Some(DiError::DepthExceeded(max_depth)));
    // The stack unwinds fully; the next attempt fails the same way
    assert_eq!(registry.get::<Loop>().err(), Some(DiError::DepthExceeded(max_depth)));
}

#[test]
fn test_deep_acyclic_chain_within_limit() {
    struct L0;
    struct L1;
    struct L2;
    struct L3;

    let config = RegistryConfig { max_depth: 4, ..RegistryConfig::default() };
    let mut registry = Registry::with_config(config);
    registry
        .register_constructor(record_needing::<L0, L1>(|| L0), ProviderKind::Singleton)
        .unwrap()
        .register_constructor(record_needing::<L1, L2>(|| L1), ProviderKind::Singleton)
        .unwrap()
        .register_constructor(record_needing::<L2, L3>(|| L2), ProviderKind::Singleton)
        .unwrap()
        .register_constructor(Constructor::record(Nominal::of::<L3>()).build(|_| Ok(L3)), ProviderKind::Singleton)
        .unwrap();

    assert!(registry.get::<L0>().is_ok());
}
