//! Shared types and models for the PackTrace supply-chain platform
//!
//! This crate contains domain models shared between the API client and
//! other components of the system.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
