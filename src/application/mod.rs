//! Application layer - commands, queries and their handlers.
//!
//! Handlers hold their ports as `Arc<dyn Port>` and are built once at
//! startup; they keep no per-request state.

pub mod handlers;

pub use handlers::*;
