//! # Utsav Common Library
//!
//! Shared code for the Utsav festival registration backend:
//! - Database initialization, schema and models
//! - Error types
//! - Configuration loading
//! - Session-token authentication helpers
//! - Event category lookup table

pub mod api;
pub mod categories;
pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
