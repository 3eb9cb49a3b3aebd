//! WebSocket event DTOs.
//!
//! Every frame is a JSON object tagged by `type` (kebab-case event name).
//! Timestamps are Unix milliseconds.

use serde::{Deserialize, Serialize};

/// Events sent FROM client TO server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientEvent {
    JoinRoom { room_id: String },
    SendMessage { room_id: String, body: String },
    MarkSeen { message_id: String },
    EditMessage { message_id: String, new_body: String },
    DeleteMessage { message_id: String },
    ClearRoom { room_id: String },
    TypingStart { room_id: String },
    TypingStop { room_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenReceiptDto {
    pub user_id: String,
    pub display_name: String,
    pub seen_at: i64,
}

/// Message as seen by clients. Local echoes carry a `temp-` id and `is_temp = true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: String,
    pub room_id: String,
    pub sender_id: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub accent_color: Option<String>,
    pub body: String,
    pub created_at: i64,
    pub edited: bool,
    pub edited_at: Option<i64>,
    pub seen_by: Vec<SeenReceiptDto>,
    pub is_temp: bool,
}

/// Events sent FROM server TO client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    LocalEcho {
        message: MessageDto,
    },
    MessageConfirmed {
        temp_id: String,
        message: MessageDto,
    },
    MessageFailed {
        temp_id: String,
    },
    NewMessage {
        message: MessageDto,
    },
    SeenUpdate {
        message_id: String,
        seen_count: usize,
        seen_by: Vec<SeenReceiptDto>,
    },
    MessageEdited {
        message_id: String,
        new_body: String,
        edited_at: i64,
    },
    MessageDeleted {
        message_id: String,
    },
    RoomCleared {
        room_id: String,
        deleted_count: usize,
    },
    PresenceCount {
        room_id: String,
        count: usize,
    },
    UserTyping {
        room_id: String,
        user_id: String,
        display_name: String,
    },
    UserStoppedTyping {
        room_id: String,
        user_id: String,
        display_name: String,
    },
    RoomHistory {
        room_id: String,
        messages: Vec<MessageDto>,
    },
    /// Reported only to the connection whose request failed
    Error {
        code: String,
        message: String,
    },
}
