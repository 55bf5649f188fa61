//! Database layer: initialization, schema, settings and shared models

pub mod init;
pub mod models;
pub mod settings;

pub use init::init_database;
