//! HTTP and WebSocket handlers.

mod http;
mod websocket;

pub use http::{clear_room_messages, get_room_messages, get_room_presence, health_check};
pub use websocket::websocket_handler;
