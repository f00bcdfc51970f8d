#![no_main]

use libfuzzer_sys::fuzz_target;
use managed_di::{compute_base_chain, normalize, unpack_if_union, Nominal, TypeDescriptor, TypeExpr};

struct A;
struct B;
struct C;

fn nominal(byte: u8) -> Nominal {
    match byte % 8 {
        0 => Nominal::of::<A>(),
        1 => Nominal::of::<B>(),
        2 => Nominal::class::<C>().param("T").extends(Nominal::of::<A>()).build(),
        3 => Nominal::list(),
        4 => Nominal::dict(),
        5 => Nominal::tuple(),
        6 => Nominal::type_of(),
        _ => Nominal::object(),
    }
}

// Decodes a type expression from a byte stream; nesting is bounded by `depth`.
fn expr(data: &mut impl Iterator<Item = u8>, depth: u8) -> TypeExpr {
    let Some(tag) = data.next() else {
        return TypeExpr::None;
    };
    if depth == 0 {
        return TypeExpr::Nominal(nominal(tag));
    }
    match tag % 7 {
        0 | 1 => TypeExpr::Nominal(nominal(tag >> 3)),
        2 => {
            let count = data.next().unwrap_or(0) % 4;
            let args = (0..count).map(|_| expr(data, depth - 1)).collect();
            TypeExpr::Generic(nominal(tag >> 3), args)
        }
        3 => TypeExpr::annotated(expr(data, depth - 1), [format!("m{}", tag >> 3)]),
        4 => {
            let count = data.next().unwrap_or(0) % 5;
            TypeExpr::Union((0..count).map(|_| expr(data, depth - 1)).collect())
        }
        5 => TypeExpr::None,
        _ => TypeExpr::Param("T"),
    }
}

fuzz_target!(|data: &[u8]| {
    let mut bytes = data.iter().copied();
    let request = expr(&mut bytes, 4);

    let Ok(descriptor) = normalize(&request) else {
        return;
    };

    // Normalizing the canonical form again is a no-op
    assert_eq!(normalize(&TypeExpr::from(descriptor.clone())).ok(), Some(descriptor.clone()));

    for alternative in unpack_if_union(&descriptor) {
        assert!(!matches!(alternative, TypeDescriptor::Union { .. }));
        if let Ok(chain) = compute_base_chain(&alternative) {
            assert_eq!(chain.first(), Some(&alternative));
            assert_eq!(chain.last(), Some(&TypeDescriptor::object()));
        }
    }
});
