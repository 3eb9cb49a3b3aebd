//! UseCase: 入力中表示の中継
//!
//! 状態を持たない。重複排除やタイムアウトはクライアントに任せる。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, PresenceRegistry, RoomEvent, RoomId, UserProfile};

use super::broadcast::RoomBroadcaster;

pub struct TypingRelayUseCase {
    broadcaster: RoomBroadcaster,
}

impl TypingRelayUseCase {
    pub fn new(presence: Arc<dyn PresenceRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            broadcaster: RoomBroadcaster::new(presence, message_pusher),
        }
    }

    /// 入力開始を発信元以外のメンバーに中継する
    pub async fn start(
        &self,
        room_id: &RoomId,
        origin: &ConnectionId,
        user: &UserProfile,
    ) -> Vec<ConnectionId> {
        let event = RoomEvent::UserTyping {
            room_id: room_id.clone(),
            user_id: user.user_id.clone(),
            display_name: user.display_name.clone(),
        };
        self.broadcaster.to_room_except(room_id, origin, &event).await
    }

    /// 入力終了を発信元以外のメンバーに中継する
    pub async fn stop(
        &self,
        room_id: &RoomId,
        origin: &ConnectionId,
        user: &UserProfile,
    ) -> Vec<ConnectionId> {
        let event = RoomEvent::UserStoppedTyping {
            room_id: room_id.clone(),
            user_id: user.user_id.clone(),
            display_name: user.display_name.clone(),
        };
        self.broadcaster.to_room_except(room_id, origin, &event).await
    }
}
