//! Configuration types
//!
//! Board configuration is fixed at compile time. The firmware build script
//! deserializes `board.toml` into these types (with the `serde` feature) and
//! rejects anything [`BoardConfig::validate`] refuses.

pub mod board;

pub use board::*;
