//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Gemini REST client, retry wrapper and a scripted mock
//! - `postgres` - sqlx-backed encounter store, case catalog and profiles
//! - `memory` - In-process implementations of the same ports
//! - `http` - axum routes exposing the application handlers

pub mod ai;
pub mod http;
pub mod memory;
pub mod postgres;
