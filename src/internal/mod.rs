//! Internal implementation details.

pub(crate) mod circular;

pub(crate) use circular::{ResolutionStack, MAX_DEPTH};
