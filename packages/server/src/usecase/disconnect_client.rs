//! UseCase: クライアント切断処理

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, PresenceRegistry, RoomEvent, RoomId};

use super::broadcast::RoomBroadcaster;

/// クライアント切断のユースケース
///
/// 在室情報から外し、残ったメンバーに新しい接続数を通知する。猶予期間は設けない。
pub struct DisconnectClientUseCase {
    /// PresenceRegistry（在室情報の抽象化）
    presence: Arc<dyn PresenceRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    broadcaster: RoomBroadcaster,
}

impl DisconnectClientUseCase {
    pub fn new(presence: Arc<dyn PresenceRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            broadcaster: RoomBroadcaster::new(presence.clone(), message_pusher.clone()),
            presence,
            message_pusher,
        }
    }

    /// 切断を実行
    ///
    /// # Returns
    ///
    /// 所属していたルームと退室後の接続数。どのルームにも入っていなければ `None`
    pub async fn execute(&self, connection_id: &ConnectionId) -> Option<(RoomId, usize)> {
        self.message_pusher.unregister_client(connection_id).await;

        let left = self.presence.leave(connection_id).await;
        if let Some((room_id, count)) = &left {
            self.broadcaster
                .to_room(
                    room_id,
                    &RoomEvent::PresenceCount {
                        room_id: room_id.clone(),
                        count: *count,
                    },
                )
                .await;
        }
        left
    }
}
