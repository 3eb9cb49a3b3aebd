//! InMemory MessageStore 実装
//!
//! メッセージを挿入順の Vec に保持します。作成日時はルーム内で単調非減少になるよう割り当てるため、
//! ルームで絞り込んだ結果は常に作成日時の昇順になります。
//!
//! プロセスが終了すると内容は失われます。永続化が必要な場合は `SqliteMessageStore` を使います。

use std::sync::Arc;

use async_trait::async_trait;
use hibiki_shared::time::Clock;
use tokio::sync::Mutex;

use crate::domain::{
    Message, MessageId, MessageMutation, MessageStore, NewMessage, RoomId, StoreError, Timestamp,
    UpdateOutcome,
};

/// インメモリ MessageStore 実装
pub struct InMemoryMessageStore {
    messages: Mutex<Vec<Message>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryMessageStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            clock,
        }
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn create(&self, message: NewMessage) -> Result<Message, StoreError> {
        let mut messages = self.messages.lock().await;

        let now = self.clock.now_millis();
        let latest_in_room = messages
            .iter()
            .rev()
            .find(|m| m.room_id == message.room_id)
            .map(|m| m.created_at.value());
        let created_at = latest_in_room.map_or(now, |latest| latest.max(now));

        let message = message.into_message(MessageId::generate(), Timestamp::new(created_at));
        messages.push(message.clone());
        Ok(message)
    }

    async fn list_by_room(
        &self,
        room_id: &RoomId,
        limit: usize,
    ) -> Result<Vec<Message>, StoreError> {
        let messages = self.messages.lock().await;
        let in_room: Vec<&Message> = messages.iter().filter(|m| &m.room_id == room_id).collect();
        let skip = in_room.len().saturating_sub(limit);
        Ok(in_room.into_iter().skip(skip).cloned().collect())
    }

    async fn find_by_id(&self, id: &MessageId) -> Result<Option<Message>, StoreError> {
        let messages = self.messages.lock().await;
        Ok(messages.iter().find(|m| &m.id == id).cloned())
    }

    async fn update(
        &self,
        id: &MessageId,
        mutation: MessageMutation,
    ) -> Result<Option<UpdateOutcome>, StoreError> {
        let mut messages = self.messages.lock().await;
        Ok(messages.iter_mut().find(|m| &m.id == id).map(|message| {
            let changed = message.apply(&mutation);
            UpdateOutcome {
                message: message.clone(),
                changed,
            }
        }))
    }

    async fn delete_by_id(&self, id: &MessageId) -> Result<bool, StoreError> {
        let mut messages = self.messages.lock().await;
        match messages.iter().position(|m| &m.id == id) {
            Some(index) => {
                messages.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_all_by_room(&self, room_id: &RoomId) -> Result<usize, StoreError> {
        let mut messages = self.messages.lock().await;
        let before = messages.len();
        messages.retain(|m| &m.room_id != room_id);
        Ok(before - messages.len())
    }
}
