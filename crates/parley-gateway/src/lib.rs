//! WebSocket gateway: authenticated connections, presence tracking and
//! point-to-point WebRTC call-signal relay.

pub mod connection;
pub mod dispatcher;
