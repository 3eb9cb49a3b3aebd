//! ルーム単位のイベント配信
//!
//! PresenceRegistry で配信先のコネクションを決め、MessagePusher で送信します。
//! 配信の失敗はログに残すだけで、呼び出し元の操作は失敗させません。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, PresenceRegistry, RoomEvent, RoomId};

#[derive(Clone)]
pub struct RoomBroadcaster {
    presence: Arc<dyn PresenceRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl RoomBroadcaster {
    pub fn new(presence: Arc<dyn PresenceRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            presence,
            message_pusher,
        }
    }

    /// 1 つのコネクションにだけ送信
    pub async fn to_connection(&self, connection_id: &ConnectionId, event: &RoomEvent) {
        if let Err(e) = self.message_pusher.push_to(connection_id, event).await {
            tracing::warn!(
                "Failed to push '{}' to connection '{}': {}",
                event.name(),
                connection_id,
                e
            );
        }
    }

    /// ルームの全コネクションに送信し、配信先を返す
    pub async fn to_room(&self, room_id: &RoomId, event: &RoomEvent) -> Vec<ConnectionId> {
        let targets = self.presence.connections_in(room_id).await;
        self.send(room_id, targets, event).await
    }

    /// `excluded` 以外のルームの全コネクションに送信し、配信先を返す
    pub async fn to_room_except(
        &self,
        room_id: &RoomId,
        excluded: &ConnectionId,
        event: &RoomEvent,
    ) -> Vec<ConnectionId> {
        let targets = self
            .presence
            .connections_in(room_id)
            .await
            .into_iter()
            .filter(|id| id != excluded)
            .collect();
        self.send(room_id, targets, event).await
    }

    async fn send(
        &self,
        room_id: &RoomId,
        targets: Vec<ConnectionId>,
        event: &RoomEvent,
    ) -> Vec<ConnectionId> {
        if let Err(e) = self
            .message_pusher
            .broadcast(targets.clone(), event)
            .await
        {
            tracing::warn!(
                "Failed to broadcast '{}' to room '{}': {}",
                event.name(),
                room_id,
                e
            );
        }
        targets
    }
}
