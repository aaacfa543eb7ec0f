//! Shared wire types: REST DTOs, the response envelope, JWT claims and
//! gateway events/commands.

pub mod api;
pub mod events;
