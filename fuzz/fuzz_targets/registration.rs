#![no_main]

use libfuzzer_sys::fuzz_target;
use managed_di::{Constructor, DiError, Nominal, ProviderKind, Registry, RegistryConfig, TypeExpr};

struct Node(u8);

struct N0;
struct N1;
struct N2;
struct N3;

fn node(index: u8) -> Nominal {
    match index % 4 {
        0 => Nominal::of::<N0>(),
        1 => Nominal::of::<N1>(),
        2 => Nominal::of::<N2>(),
        _ => Nominal::of::<N3>(),
    }
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let config = RegistryConfig {
        max_depth: 1 + (data[0] % 32) as usize,
        detect_cycles: data[0] & 0x80 == 0,
        ..RegistryConfig::default()
    };
    let mut registry = Registry::with_config(config);

    // Each pair of bytes registers one constructor: its type and one dependency.
    for (i, pair) in data[1..].chunks_exact(2).take(8).enumerate() {
        let id = i as u8;
        let kind = if pair[0] & 0x40 == 0 { ProviderKind::Singleton } else { ProviderKind::Factory };
        let dependency: TypeExpr = match pair[1] % 3 {
            0 => node(pair[1] >> 2).into(),
            1 => TypeExpr::optional(node(pair[1] >> 2)),
            _ => TypeExpr::list_of(node(pair[1] >> 2)),
        };
        let ctor = Constructor::record(node(pair[0]))
            .field("dep", dependency)
            .build(move |_| Ok(Node(id)));
        let _ = registry.register_constructor(ctor, kind);
    }

    for index in 0..4 {
        match registry.get_dependency(node(index)) {
            Ok(value) => assert!(value.is::<Node>()),
            Err(DiError::DependencyNotFound(_))
            | Err(DiError::NoUniqueDependency { .. })
            | Err(DiError::Circular(_))
            | Err(DiError::DepthExceeded(_)) => {}
            Err(other) => panic!("unexpected error: {}", other),
        }
        let _ = registry.get_dependencies(TypeExpr::list_of(node(index)));
    }
});
