//! ルームイベント
//!
//! UseCase 層からクライアントへ通知される出来事。ワイヤーフォーマットへの変換は
//! Infrastructure 層の DTO が担当する。

use super::entity::{LocalEcho, Message, SeenReceipt};
use super::value_object::{MessageBody, MessageId, RoomId, TempMessageId, Timestamp, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    /// 送信者のみに届くローカルエコー
    LocalEcho(LocalEcho),
    /// 一時 ID と永続化済みメッセージの対応付け（送信者のみ）
    MessageConfirmed {
        temp_id: TempMessageId,
        message: Message,
    },
    /// 永続化の失敗（送信者のみ）。エコーした時の一時 ID をそのまま使う
    MessageFailed { temp_id: TempMessageId },
    /// 永続化済みの新着メッセージ（送信者以外）
    NewMessage(Message),
    SeenUpdate {
        message_id: MessageId,
        seen_by: Vec<SeenReceipt>,
    },
    MessageEdited {
        message_id: MessageId,
        body: MessageBody,
        edited_at: Timestamp,
    },
    MessageDeleted { message_id: MessageId },
    RoomCleared {
        room_id: RoomId,
        deleted_count: usize,
    },
    PresenceCount { room_id: RoomId, count: usize },
    UserTyping {
        room_id: RoomId,
        user_id: UserId,
        display_name: String,
    },
    UserStoppedTyping {
        room_id: RoomId,
        user_id: UserId,
        display_name: String,
    },
    /// 入室直後の履歴（入室したコネクションのみ）
    RoomHistory {
        room_id: RoomId,
        messages: Vec<Message>,
    },
}

impl RoomEvent {
    /// ログ出力用のイベント名
    pub fn name(&self) -> &'static str {
        match self {
            Self::LocalEcho(_) => "local-echo",
            Self::MessageConfirmed { .. } => "message-confirmed",
            Self::MessageFailed { .. } => "message-failed",
            Self::NewMessage(_) => "new-message",
            Self::SeenUpdate { .. } => "seen-update",
            Self::MessageEdited { .. } => "message-edited",
            Self::MessageDeleted { .. } => "message-deleted",
            Self::RoomCleared { .. } => "room-cleared",
            Self::PresenceCount { .. } => "presence-count",
            Self::UserTyping { .. } => "user-typing",
            Self::UserStoppedTyping { .. } => "user-stopped-typing",
            Self::RoomHistory { .. } => "room-history",
        }
    }
}
