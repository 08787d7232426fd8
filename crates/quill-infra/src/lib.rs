//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL repositories via SeaORM; the
//!   in-memory repository is always available

pub mod auth;
pub mod database;

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
pub use database::{DatabaseConfig, InMemoryRepository};
