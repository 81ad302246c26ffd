//! Core types and the pure balance and settlement computations.
//!
//! Nothing in here performs I/O apart from the repository traits in
//! [`ports`], which the application layer drives.

pub mod balance;
pub mod model;
pub mod money;
pub mod ports;
pub mod simplify;
pub mod split;
