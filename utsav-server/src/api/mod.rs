//! HTTP API: router, handlers, and the principal extractor

pub mod extract;
pub mod handlers;
pub mod server;

pub use server::{build_router, AppContext};
