//! Bargain Bin library crate: re-exports all modules for integration testing.
//!
//! The binary crate (`main.rs`) is the actual game entry point.
//! This library crate exposes the same modules so that `tests/` integration
//! tests can drive the shop without needing a window or GPU.

pub mod shared;
pub mod data;
pub mod catalog;
pub mod economy;
pub mod session;
pub mod snapshot;
pub mod ui;
