//! # Utsav Registration Server
//!
//! Festival registration backend: self-service and venue ("spot")
//! registration submission, payment classification, and the admin
//! operations around them.
//!
//! The admission engine validates submissions against event rules and relies
//! on the store's channel-scoped unique indexes, never in-process locks, to
//! serialize concurrent duplicates.

pub mod api;
pub mod db;
pub mod error;
pub mod mail;
pub mod registration;

pub use error::{Error, Result};
pub use registration::RegistrationEngine;
