//! Real-time room chat relay library.
//!
//! This library provides the presence, optimistic echo, read receipt and
//! moderation engine behind the Hibiki WebSocket server.

pub mod config;

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
