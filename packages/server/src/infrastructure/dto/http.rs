//! HTTP API response DTOs.
//!
//! Timestamps are rendered as RFC 3339 strings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptDetailDto {
    pub user_id: String,
    pub display_name: String,
    pub seen_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDetailDto {
    pub id: String,
    pub sender_id: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub accent_color: Option<String>,
    pub body: String,
    pub created_at: String,
    pub edited: bool,
    pub edited_at: Option<String>,
    pub seen_by: Vec<ReceiptDetailDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomHistoryDto {
    pub room_id: String,
    pub messages: Vec<MessageDetailDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomPresenceDto {
    pub room_id: String,
    pub count: usize,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomClearedDto {
    pub room_id: String,
    pub deleted_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDto {
    pub code: String,
    pub message: String,
}
