//! Utilities shared by the Hibiki packages.

pub mod logger;
pub mod time;
