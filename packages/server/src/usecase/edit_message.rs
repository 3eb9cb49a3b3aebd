//! UseCase: メッセージ編集
//!
//! 編集できるのは送信者本人だけ。モデレーター権限があっても他人のメッセージは編集できない。

use std::sync::Arc;

use hibiki_shared::time::Clock;

use crate::domain::{
    Message, MessageBody, MessageId, MessageMutation, MessagePusher, MessageStore,
    PresenceRegistry, RoomEvent, Timestamp, UserId,
};

use super::{broadcast::RoomBroadcaster, error::ChatError};

pub struct EditMessageUseCase {
    store: Arc<dyn MessageStore>,
    broadcaster: RoomBroadcaster,
    clock: Arc<dyn Clock>,
}

impl EditMessageUseCase {
    pub fn new(
        store: Arc<dyn MessageStore>,
        presence: Arc<dyn PresenceRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            broadcaster: RoomBroadcaster::new(presence, message_pusher),
            clock,
        }
    }

    /// 編集を実行し、ルーム全体に `message-edited` を送る
    pub async fn execute(
        &self,
        message_id: &MessageId,
        requester: &UserId,
        new_body: String,
    ) -> Result<Message, ChatError> {
        let body = MessageBody::new(new_body)?;

        let message = self
            .store
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| ChatError::message_not_found(message_id))?;
        if !message.is_sent_by(requester) {
            tracing::warn!(
                "User '{}' tried to edit message '{}' owned by '{}'",
                requester,
                message_id,
                message.sender.user_id
            );
            return Err(ChatError::Unauthorized(
                "only the sender can edit a message".to_string(),
            ));
        }

        let edited_at = Timestamp::new(self.clock.now_millis());
        let updated = self
            .store
            .update(
                message_id,
                MessageMutation::Edit {
                    body: body.clone(),
                    edited_at,
                },
            )
            .await?
            .ok_or_else(|| ChatError::message_not_found(message_id))?
            .message;

        self.broadcaster
            .to_room(
                &updated.room_id,
                &RoomEvent::MessageEdited {
                    message_id: updated.id.clone(),
                    body,
                    edited_at,
                },
            )
            .await;
        tracing::info!("Message '{}' edited by '{}'", message_id, requester);

        Ok(updated)
    }
}
