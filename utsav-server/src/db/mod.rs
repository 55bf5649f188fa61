//! Database access modules, one per table

pub mod events;
pub mod registrations;
pub mod users;
