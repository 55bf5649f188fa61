//! Shared API support: authentication helpers and wire types

pub mod auth;
pub mod types;

pub use auth::Principal;
pub use types::ErrorBody;
