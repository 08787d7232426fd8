//! # Quill Core
//!
//! The domain layer of the Quill backend: accounts, composed posts and the
//! favorites relation between them.
//! This crate contains pure business logic with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::DomainError;
pub use services::AccountService;
