//! HTTP middleware for axum.
//!
//! - `auth` - Learner identity middleware and extractors

pub mod auth;

pub use auth::{identity_middleware, AuthRejection, AuthenticatedUser, RequireAuth, USER_ID_HEADER};
