/// Tests for modular registration: dependency modules and annotation scanning.

use managed_di::{
    Annotations, Constructor, DependencyModule, DiError, DiResult, Module, Nominal, ProviderKind, Registry,
    RegistryExt,
};
use std::sync::Arc;

// ===== Test Dependencies =====

#[derive(Debug)]
struct Config {
    name: String,
}

struct Database {
    config: Arc<Config>,
}

struct UserService;
struct OrgService;
struct Helper;

fn database_ctor() -> Constructor {
    Constructor::record(Nominal::of::<Database>())
        .field("config", Nominal::of::<Config>())
        .build(|args| Ok(Database { config: args.get("config")? }))
}

// ===== Test Modules =====

struct ConfigModule;

impl DependencyModule for ConfigModule {
    fn register_dependencies(self, registry: &mut Registry) -> DiResult<()> {
        registry.register_value(Config { name: "test-config".to_string() })?;
        Ok(())
    }
}

struct DatabaseModule;

impl DependencyModule for DatabaseModule {
    fn register_dependencies(self, registry: &mut Registry) -> DiResult<()> {
        registry.register_constructor(database_ctor(), ProviderKind::Singleton)?;
        Ok(())
    }
}

struct FailingModule;

impl DependencyModule for FailingModule {
    fn register_dependencies(self, registry: &mut Registry) -> DiResult<()> {
        let ctor = Constructor::function("broken").build(|_| Ok(Helper));
        registry.register_constructor(ctor, ProviderKind::Singleton)?;
        Ok(())
    }
}

#[test]
fn test_add_module_in_place() {
    let mut registry = Registry::new();
    registry.add_module(ConfigModule).unwrap().add_module(DatabaseModule).unwrap();

    let db = registry.get::<Database>().unwrap();
    assert_eq!(db.config.name, "test-config");
}

#[test]
fn test_with_module_chaining() {
    let registry = Registry::new()
        .with_module(ConfigModule)
        .unwrap()
        .with_module(DatabaseModule)
        .unwrap();

    assert!(registry.get::<Database>().is_ok());
}

#[test]
fn test_module_errors_propagate() {
    let mut registry = Registry::new();
    let err = registry.add_module(FailingModule).err().unwrap();
    assert_eq!(err, DiError::ReturnTypeNotAnnotated("broken".to_string()));
}

#[test]
fn test_scan_registers_annotated_members() {
    let user = Constructor::record(Nominal::of::<UserService>()).build(|_| Ok(UserService));
    let org = Constructor::record(Nominal::of::<OrgService>()).build(|_| Ok(OrgService));
    let helper = Constructor::record(Nominal::of::<Helper>()).build(|_| Ok(Helper));

    let mut annotations = Annotations::new();
    annotations.managed(&user).managed_as(&org, ProviderKind::Factory);

    let package = Module::new("app")
        .member("UserService", &user)
        .member("Helper", &helper)
        .submodule(Module::new("org").member("OrgService", &org));

    let mut registry = Registry::new();
    registry.scan(&annotations, [&package]).unwrap();

    let a = registry.get::<UserService>().unwrap();
    let b = registry.get::<UserService>().unwrap();
    assert!(Arc::ptr_eq(&a, &b));

    let c = registry.get::<OrgService>().unwrap();
    let d = registry.get::<OrgService>().unwrap();
    assert!(!Arc::ptr_eq(&c, &d));

    // Unannotated members are left alone
    assert!(!registry.contains(Nominal::of::<Helper>()));
}

#[test]
fn test_scan_skips_private_members() {
    let hidden = Constructor::record(Nominal::of::<Helper>()).build(|_| Ok(Helper));
    let mut annotations = Annotations::new();
    annotations.managed(&hidden);

    let package = Module::new("app").member("_Helper", &hidden);

    let mut registry = Registry::new();
    registry.scan(&annotations, [&package]).unwrap();
    assert!(!registry.contains(Nominal::of::<Helper>()));
}

#[test]
fn test_scan_registers_reexported_constructor_once() {
    let user = Constructor::record(Nominal::of::<UserService>()).build(|_| Ok(UserService));
    let mut annotations = Annotations::new();
    annotations.managed(&user);

    let services = Module::new("services").member("UserService", &user);
    let package = Module::new("app")
        .member("UserService", &user)
        .submodule(services.clone());

    let mut registry = Registry::new();
    // The same module reached twice is scanned once
    registry.scan(&annotations, [&package, &package]).unwrap();

    assert_eq!(registry.get_dependencies(Nominal::of::<UserService>()).unwrap().len(), 1);
    assert!(registry.get::<UserService>().is_ok());
}

#[test]
fn test_scan_then_explicit_registration_collides() {
    let user = Constructor::record(Nominal::of::<UserService>()).build(|_| Ok(UserService));
    let mut annotations = Annotations::new();
    annotations.managed(&user);

    let mut registry = Registry::new();
    registry.scan(&annotations, [&Module::new("app").member("UserService", &user)]).unwrap();

    assert_eq!(
        registry.register_constructor(user, ProviderKind::Singleton).err(),
        Some(DiError::ConstructorExists("UserService".to_string()))
    );
}
