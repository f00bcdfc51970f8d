//! Circular dependency detection infrastructure.

use std::cell::RefCell;

use crate::error::{DiError, DiResult};
use crate::registration::Constructor;

// Each level of provider construction costs several stack frames; this
// default stays inside a 2 MiB thread stack in debug builds.
pub(crate) const MAX_DEPTH: usize = 128;

/// Constructors whose providers are currently being built, innermost last.
///
/// Owned by one registry; single-threaded like the registry itself.
#[derive(Default)]
pub(crate) struct ResolutionStack {
    stack: RefCell<Vec<Constructor>>,
}

impl ResolutionStack {
    /// Pushes `ctor`, failing on re-entry (when `detect_cycles`) or past `max_depth`.
    pub(crate) fn enter(
        &self,
        ctor: &Constructor,
        detect_cycles: bool,
        max_depth: usize,
    ) -> DiResult<StackGuard<'_>> {
        let mut stack = self.stack.borrow_mut();

        // Circular detection BEFORE pushing the new constructor
        if detect_cycles && stack.iter().any(|c| c == ctor) {
            let mut path: Vec<String> = stack.iter().map(|c| c.name().to_string()).collect();
            path.push(ctor.name().to_string());
            return Err(DiError::Circular(path));
        }

        if stack.len() >= max_depth {
            return Err(DiError::DepthExceeded(stack.len()));
        }

        stack.push(ctor.clone());
        Ok(StackGuard { owner: self })
    }

    pub(crate) fn depth(&self) -> usize {
        self.stack.borrow().len()
    }
}

/// Pops its constructor when dropped, on success and error paths alike.
pub(crate) struct StackGuard<'a> {
    owner: &'a ResolutionStack,
}

impl Drop for StackGuard<'_> {
    fn drop(&mut self) {
        self.owner.stack.borrow_mut().pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Nominal;

    struct A;
    struct B;

    fn ctor<T: Send + Sync + 'static>(value: fn() -> T) -> Constructor {
        Constructor::record(Nominal::of::<T>()).build(move |_| Ok(value()))
    }

    #[test]
    fn reentry_reports_path() {
        let stack = ResolutionStack::default();
        let a = ctor(|| A);
        let b = ctor(|| B);

        let _ga = stack.enter(&a, true, MAX_DEPTH).unwrap();
        let _gb = stack.enter(&b, true, MAX_DEPTH).unwrap();
        match stack.enter(&a, true, MAX_DEPTH) {
            Err(DiError::Circular(path)) => assert_eq!(path, vec!["A", "B", "A"]),
            other => panic!("expected circular error, got {:?}", other.map(|_| ())),
        }
        assert_eq!(stack.depth(), 2);
    }

    #[test]
    fn guard_pops_on_drop() {
        let stack = ResolutionStack::default();
        let a = ctor(|| A);
        {
            let _guard = stack.enter(&a, true, MAX_DEPTH).unwrap();
            assert_eq!(stack.depth(), 1);
        }
        assert_eq!(stack.depth(), 0);
        assert!(stack.enter(&a, true, MAX_DEPTH).is_ok());
    }

    #[test]
    fn depth_limit_applies_without_cycle_detection() {
        let stack = ResolutionStack::default();
        let a = ctor(|| A);
        let _g1 = stack.enter(&a, false, 2).unwrap();
        let _g2 = stack.enter(&a, false, 2).unwrap();
        assert_eq!(stack.enter(&a, false, 2).err(), Some(DiError::DepthExceeded(2)));
    }
}
