//! Internal data structures.
//!
//! [`Slab`] backs the task registry: it hands out the small keys tasks use
//! to deregister themselves once they reach a terminal state.

mod slab;

pub(crate) use slab::Slab;
