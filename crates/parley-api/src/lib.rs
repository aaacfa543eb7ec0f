//! REST layer: deserializes requests, drives the message pipeline and the
//! user/auth/file services, and wraps results in the `ApiResponse`
//! envelope.

pub mod auth;
pub mod files;
pub mod messages;
pub mod middleware;
pub mod response;
pub mod users;
