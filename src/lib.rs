//! Progression core of an incremental game: content catalog, effect
//! aggregation, economy, auto-buyers, the reducer, and the save lifecycle.
//!
//! Everything except the browser host builds natively; `session::Session`
//! with `persist::store::MemoryStore` and `persist::scheduler::ManualHost`
//! runs a full game headless.

pub mod catalog;
pub mod error;
pub mod game;
pub mod persist;
pub mod session;
pub mod time;

#[cfg(target_arch = "wasm32")]
pub mod host;
#[cfg(target_arch = "wasm32")]
mod logging;
