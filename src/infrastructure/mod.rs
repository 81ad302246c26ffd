//! Repository adapters.

pub mod in_memory;
