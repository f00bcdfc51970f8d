use managed_di::{
    Constructor, DiError, Nominal, Parameter, ProviderKind, Registry, TypeExpr, Value,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

#[derive(Debug)]
struct Config {
    port: u16,
}

#[derive(Debug)]
struct Server {
    config: Arc<Config>,
    name: String,
}

#[test]
fn test_register_value_resolves_same_instance() {
    init_tracing();
    let mut registry = Registry::new();
    registry.register_value(Config { port: 8080 }).unwrap();

    let a = registry.get::<Config>().unwrap();
    let b = registry.get::<Config>().unwrap();

    assert_eq!(a.port, 8080);
    assert!(Arc::ptr_eq(&a, &b)); // Same instance
}

#[test]
fn test_record_with_dependencies() {
    init_tracing();
    let mut registry = Registry::new();
    registry.register_value(Config { port: 8080 }).unwrap();
    registry
        .register_constructor(
            Constructor::record(Nominal::of::<Server>())
                .field("config", Nominal::of::<Config>())
                .field_with_default("name", Nominal::of::<String>())
                .build(|args| {
                    Ok(Server { config: args.get("config")?, name: "MyServer".to_string() })
                }),
            ProviderKind::Singleton,
        )
        .unwrap();

    let server = registry.get::<Server>().unwrap();
    assert_eq!(server.config.port, 8080);
    assert_eq!(server.name, "MyServer");
}

#[test]
fn test_singleton_is_constructed_once() {
    struct Counted(usize);

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let mut registry = Registry::new();
    registry
        .register_constructor(
            Constructor::record(Nominal::of::<Counted>())
                .build(move |_| Ok(Counted(counter.fetch_add(1, Ordering::SeqCst)))),
            ProviderKind::Singleton,
        )
        .unwrap();

    let a = registry.get::<Counted>().unwrap();
    let b = registry.get::<Counted>().unwrap();

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.0, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_factory_creates_new_instances() {
    struct Request(usize);

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let mut registry = Registry::new();
    registry
        .register_constructor(
            Constructor::record(Nominal::of::<Request>())
                .build(move |_| Ok(Request(counter.fetch_add(1, Ordering::SeqCst)))),
            ProviderKind::Factory,
        )
        .unwrap();

    let a = registry.get::<Request>().unwrap();
    let b = registry.get::<Request>().unwrap();
    let c = registry.get::<Request>().unwrap();

    assert_eq!((a.0, b.0, c.0), (0, 1, 2));
    assert!(!Arc::ptr_eq(&a, &b));
}

#[test]
fn test_singleton_identity_holds_across_base_chain() {
    struct Repository;
    struct PgRepository;

    let repo = Nominal::of::<Repository>();
    let pg = Nominal::class::<PgRepository>().extends(repo.clone()).build();

    let mut registry = Registry::new();
    registry
        .register_constructor(
            Constructor::record(pg.clone()).build(|_| Ok(PgRepository)),
            ProviderKind::Singleton,
        )
        .unwrap();

    let by_base = registry.get_dependency(repo).unwrap();
    let by_self = registry.get_dependency(pg).unwrap();

    assert!(by_base.is::<PgRepository>());
    assert!(by_base.ptr_eq(&by_self));
}

#[test]
fn test_function_constructor_binds_positional_and_keyword_parameters() {
    struct Pool;
    struct Limits;
    struct Client {
        positional: usize,
        keywords: Vec<&'static str>,
    }

    let mut registry = Registry::new();
    registry.register_value(Pool).unwrap();
    registry.register_value(Limits).unwrap();
    registry
        .register_constructor(
            Constructor::function("make_client")
                .returns(Nominal::of::<Client>())
                .param(Parameter::positional_only("pool", Nominal::of::<Pool>()))
                .param(Parameter::keyword("limits", Nominal::of::<Limits>()))
                .build(|args| {
                    args.get_at::<Pool>(0)?;
                    args.get::<Limits>("limits")?;
                    Ok(Client { positional: args.positional_len(), keywords: args.keyword_names().collect() })
                }),
            ProviderKind::Factory,
        )
        .unwrap();

    let client = registry.get::<Client>().unwrap();
    assert_eq!(client.positional, 1);
    assert_eq!(client.keywords, vec!["limits"]);
}

#[test]
fn test_function_constructor_may_return_shared_instance() {
    struct Settings;

    let shared = Value::new(Settings);
    let returned = shared.clone();

    let mut registry = Registry::new();
    registry
        .register_constructor(
            Constructor::function("settings")
                .returns(Nominal::of::<Settings>())
                .build_value(move |_| Ok(returned.clone())),
            ProviderKind::Factory,
        )
        .unwrap();

    let value = registry.get_dependency(Nominal::of::<Settings>()).unwrap();
    assert!(value.ptr_eq(&shared));
}

#[test]
fn test_missing_dependency() {
    struct Unregistered;

    let registry = Registry::new();
    match registry.get::<Unregistered>() {
        Err(DiError::DependencyNotFound(ty)) => assert_eq!(ty, "Unregistered"),
        other => panic!("expected not found, got {:?}", other.map(|_| ())),
    }
    assert!(!registry.contains(Nominal::of::<Unregistered>()));
}

#[test]
fn test_none_resolves_to_null() {
    let registry = Registry::new();
    let value = registry.get_dependency(TypeExpr::None).unwrap();
    assert!(value.is_null());
    assert!(registry.contains(TypeExpr::None));
}

#[test]
fn test_constructor_errors_propagate() {
    struct Fragile;

    let mut registry = Registry::new();
    registry
        .register_constructor(
            Constructor::record(Nominal::of::<Fragile>())
                .build(|_| -> managed_di::DiResult<Fragile> { Err(DiError::TypeMismatch("Fragile")) }),
            ProviderKind::Singleton,
        )
        .unwrap();

    assert_eq!(registry.get::<Fragile>().err(), Some(DiError::TypeMismatch("Fragile")));
}

#[test]
fn test_descriptors_report_registrations() {
    struct Service;

    let mut registry = Registry::new();
    let before = registry.len();
    registry
        .register_constructor(
            Constructor::record(Nominal::of::<Service>()).build(|_| Ok(Service)),
            ProviderKind::Factory,
        )
        .unwrap();

    assert_eq!(registry.len(), before + 1);
    let descriptor = registry
        .descriptors()
        .into_iter()
        .find(|d| d.constructor == "Service")
        .unwrap();
    assert_eq!(descriptor.kind, ProviderKind::Factory);
    assert_eq!(descriptor.type_name(), "Service");
    assert!(!descriptor.provider_built);
}
