//! Conversion logic between domain entities and DTOs.

use hibiki_shared::time::timestamp_to_rfc3339;

use crate::domain::{LocalEcho, Message, RoomEvent, SeenReceipt};
use crate::infrastructure::dto::{http, websocket as dto};

// ========================================
// Domain Entity → WebSocket DTO
// ========================================

impl From<SeenReceipt> for dto::SeenReceiptDto {
    fn from(model: SeenReceipt) -> Self {
        Self {
            user_id: model.user_id.into_string(),
            display_name: model.display_name,
            seen_at: model.seen_at.value(),
        }
    }
}

impl From<Message> for dto::MessageDto {
    fn from(model: Message) -> Self {
        Self {
            id: model.id.into_string(),
            room_id: model.room_id.into_string(),
            sender_id: model.sender.user_id.into_string(),
            display_name: model.sender.display_name,
            avatar_url: model.sender.avatar_url,
            accent_color: model.sender.accent_color,
            body: model.body.into_string(),
            created_at: model.created_at.value(),
            edited: model.edited,
            edited_at: model.edited_at.map(|t| t.value()),
            seen_by: model.seen_by.into_iter().map(Into::into).collect(),
            is_temp: false,
        }
    }
}

impl From<LocalEcho> for dto::MessageDto {
    fn from(model: LocalEcho) -> Self {
        Self {
            id: model.temp_id.as_str().to_string(),
            room_id: model.room_id.into_string(),
            sender_id: model.sender.user_id.into_string(),
            display_name: model.sender.display_name,
            avatar_url: model.sender.avatar_url,
            accent_color: model.sender.accent_color,
            body: model.body.into_string(),
            created_at: model.created_at.value(),
            edited: false,
            edited_at: None,
            seen_by: model.seen_by.into_iter().map(Into::into).collect(),
            is_temp: true,
        }
    }
}

impl From<RoomEvent> for dto::ServerEvent {
    fn from(event: RoomEvent) -> Self {
        match event {
            RoomEvent::LocalEcho(echo) => Self::LocalEcho {
                message: echo.into(),
            },
            RoomEvent::MessageConfirmed { temp_id, message } => Self::MessageConfirmed {
                temp_id: temp_id.as_str().to_string(),
                message: message.into(),
            },
            RoomEvent::MessageFailed { temp_id } => Self::MessageFailed {
                temp_id: temp_id.as_str().to_string(),
            },
            RoomEvent::NewMessage(message) => Self::NewMessage {
                message: message.into(),
            },
            RoomEvent::SeenUpdate {
                message_id,
                seen_by,
            } => Self::SeenUpdate {
                message_id: message_id.into_string(),
                seen_count: seen_by.len(),
                seen_by: seen_by.into_iter().map(Into::into).collect(),
            },
            RoomEvent::MessageEdited {
                message_id,
                body,
                edited_at,
            } => Self::MessageEdited {
                message_id: message_id.into_string(),
                new_body: body.into_string(),
                edited_at: edited_at.value(),
            },
            RoomEvent::MessageDeleted { message_id } => Self::MessageDeleted {
                message_id: message_id.into_string(),
            },
            RoomEvent::RoomCleared {
                room_id,
                deleted_count,
            } => Self::RoomCleared {
                room_id: room_id.into_string(),
                deleted_count,
            },
            RoomEvent::PresenceCount { room_id, count } => Self::PresenceCount {
                room_id: room_id.into_string(),
                count,
            },
            RoomEvent::UserTyping {
                room_id,
                user_id,
                display_name,
            } => Self::UserTyping {
                room_id: room_id.into_string(),
                user_id: user_id.into_string(),
                display_name,
            },
            RoomEvent::UserStoppedTyping {
                room_id,
                user_id,
                display_name,
            } => Self::UserStoppedTyping {
                room_id: room_id.into_string(),
                user_id: user_id.into_string(),
                display_name,
            },
            RoomEvent::RoomHistory { room_id, messages } => Self::RoomHistory {
                room_id: room_id.into_string(),
                messages: messages.into_iter().map(Into::into).collect(),
            },
        }
    }
}

// ========================================
// Domain Entity → HTTP DTO
// ========================================

impl From<Message> for http::MessageDetailDto {
    fn from(model: Message) -> Self {
        Self {
            id: model.id.into_string(),
            sender_id: model.sender.user_id.into_string(),
            display_name: model.sender.display_name,
            avatar_url: model.sender.avatar_url,
            accent_color: model.sender.accent_color,
            body: model.body.into_string(),
            created_at: timestamp_to_rfc3339(model.created_at.value()),
            edited: model.edited,
            edited_at: model.edited_at.map(|t| timestamp_to_rfc3339(t.value())),
            seen_by: model
                .seen_by
                .into_iter()
                .map(|r| http::ReceiptDetailDto {
                    user_id: r.user_id.into_string(),
                    display_name: r.display_name,
                    seen_at: timestamp_to_rfc3339(r.seen_at.value()),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        MessageBody, MessageId, NewMessage, RoomId, Timestamp, UserId, UserProfile,
    };

    fn alice() -> UserProfile {
        UserProfile {
            user_id: UserId::new("alice".to_string()).unwrap(),
            display_name: "Alice".to_string(),
            avatar_url: None,
            accent_color: Some("#123456".to_string()),
        }
    }

    fn persisted_message() -> Message {
        let sender = alice();
        NewMessage {
            room_id: RoomId::new("r1".to_string()).unwrap(),
            seen_by: vec![sender.receipt_at(Timestamp::new(1000))],
            sender,
            body: MessageBody::new("hello".to_string()).unwrap(),
        }
        .into_message(
            MessageId::new("m-1".to_string()).unwrap(),
            Timestamp::new(1000),
        )
    }

    #[test]
    fn test_local_echo_to_dto_is_marked_temp() {
        // テスト項目: ローカルエコーは一時 ID と is_temp = true を持つ DTO になる
        // given (前提条件):
        let echo = LocalEcho::new(
            RoomId::new("r1".to_string()).unwrap(),
            alice(),
            MessageBody::new("hi".to_string()).unwrap(),
            Timestamp::new(5),
        );
        let temp_id = echo.temp_id.as_str().to_string();

        // when (操作):
        let dto_msg: dto::MessageDto = echo.into();

        // then (期待する結果):
        assert!(dto_msg.is_temp);
        assert_eq!(dto_msg.id, temp_id);
        assert_eq!(dto_msg.seen_by.len(), 1);
        assert_eq!(dto_msg.seen_by[0].user_id, "alice");
    }

    #[test]
    fn test_seen_update_carries_count() {
        // テスト項目: seen-update イベントにレシート件数が含まれる
        // given (前提条件):
        let message = persisted_message();
        let event = RoomEvent::SeenUpdate {
            message_id: message.id.clone(),
            seen_by: message.seen_by.clone(),
        };

        // when (操作):
        let server_event: dto::ServerEvent = event.into();

        // then (期待する結果):
        match server_event {
            dto::ServerEvent::SeenUpdate {
                message_id,
                seen_count,
                seen_by,
            } => {
                assert_eq!(message_id, "m-1");
                assert_eq!(seen_count, 1);
                assert_eq!(seen_by[0].display_name, "Alice");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_server_event_json_uses_kebab_case_type() {
        // テスト項目: JSON の type はケバブケースのイベント名になる
        // given (前提条件):
        let event: dto::ServerEvent = RoomEvent::NewMessage(persisted_message()).into();

        // when (操作):
        let json = serde_json::to_value(&event).unwrap();

        // then (期待する結果):
        assert_eq!(json["type"], "new-message");
        assert_eq!(json["message"]["is_temp"], false);
        assert_eq!(json["message"]["accent_color"], "#123456");
    }

    #[test]
    fn test_client_event_parses_from_json() {
        // テスト項目: クライアントからの JSON がイベントとして解釈される
        // given (前提条件):
        let json = r#"{"type":"edit-message","message_id":"m-1","new_body":"bye"}"#;

        // when (操作):
        let event: dto::ClientEvent = serde_json::from_str(json).unwrap();

        // then (期待する結果):
        assert_eq!(
            event,
            dto::ClientEvent::EditMessage {
                message_id: "m-1".to_string(),
                new_body: "bye".to_string(),
            }
        );
    }

    #[test]
    fn test_message_to_http_dto_renders_rfc3339() {
        // テスト項目: HTTP DTO では日時が RFC 3339 文字列になる
        // given (前提条件):
        let message = persisted_message();

        // when (操作):
        let detail: http::MessageDetailDto = message.into();

        // then (期待する結果):
        assert!(detail.created_at.starts_with("1970-01-01T00:00:01"));
        assert_eq!(detail.edited_at, None);
        assert_eq!(detail.seen_by[0].user_id, "alice");
    }
}
