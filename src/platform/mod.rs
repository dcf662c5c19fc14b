//! Platform abstraction layer
//!
//! Browser bindings live in `web` (wasm32 only):
//! - Canvas lookup and sizing
//! - requestAnimationFrame loop with cancellation
//! - DOM input listeners with teardown
//! - JS host callbacks

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(target_arch = "wasm32")]
pub use web::ArcadeHandle;
