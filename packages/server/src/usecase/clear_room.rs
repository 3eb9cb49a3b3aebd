//! UseCase: ルームのメッセージ一括削除（モデレーター専用）

use std::sync::Arc;

use crate::domain::{MessagePusher, MessageStore, PresenceRegistry, RoomEvent, RoomId};

use super::{broadcast::RoomBroadcaster, error::ChatError};

pub struct ClearRoomUseCase {
    store: Arc<dyn MessageStore>,
    broadcaster: RoomBroadcaster,
}

impl ClearRoomUseCase {
    pub fn new(
        store: Arc<dyn MessageStore>,
        presence: Arc<dyn PresenceRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            store,
            broadcaster: RoomBroadcaster::new(presence, message_pusher),
        }
    }

    /// ルームのメッセージをすべて削除し、削除件数を返す
    ///
    /// 他のルームのメッセージには触れない。
    pub async fn execute(
        &self,
        room_id: &RoomId,
        requester_is_privileged: bool,
    ) -> Result<usize, ChatError> {
        if !requester_is_privileged {
            tracing::warn!("Rejected non-privileged clear of room '{}'", room_id);
            return Err(ChatError::Unauthorized(
                "only a moderator can clear a room".to_string(),
            ));
        }

        let deleted_count = self.store.delete_all_by_room(room_id).await?;

        self.broadcaster
            .to_room(
                room_id,
                &RoomEvent::RoomCleared {
                    room_id: room_id.clone(),
                    deleted_count,
                },
            )
            .await;
        tracing::info!("Room '{}' cleared ({} message(s))", room_id, deleted_count);

        Ok(deleted_count)
    }
}
