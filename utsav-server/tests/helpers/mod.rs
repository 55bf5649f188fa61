//! Shared test helpers

pub mod test_server;

pub use test_server::{
    count_registrations, event_spec, leader, self_request, spot_request, RecordingMailer,
    TestServer,
};
