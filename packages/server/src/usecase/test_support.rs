//! UseCase テスト用のヘルパー

use std::sync::Arc;

use async_trait::async_trait;
use hibiki_shared::time::{Clock, FixedClock};
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, MessagePushError, MessagePusher, MessageStore, PresenceRegistry, PusherChannel,
    RoomEvent, RoomId, UserId, UserProfile,
};
use crate::infrastructure::repository::{InMemoryMessageStore, InMemoryPresenceRegistry};

use super::{MarkSeenUseCase, RoomBroadcaster, SendMessageUseCase};

pub const NOW: i64 = 1_700_000_000_000;

/// 送信されたイベントを記録するだけの MessagePusher
#[derive(Default)]
pub struct RecordingMessagePusher {
    events: Mutex<Vec<(ConnectionId, RoomEvent)>>,
}

impl RecordingMessagePusher {
    pub async fn events_for(&self, connection_id: &ConnectionId) -> Vec<RoomEvent> {
        self.events
            .lock()
            .await
            .iter()
            .filter(|(id, _)| id == connection_id)
            .map(|(_, event)| event.clone())
            .collect()
    }

    pub async fn clear(&self) {
        self.events.lock().await.clear();
    }
}

#[async_trait]
impl MessagePusher for RecordingMessagePusher {
    async fn register_client(&self, _connection_id: ConnectionId, _sender: PusherChannel) {}

    async fn unregister_client(&self, _connection_id: &ConnectionId) {}

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &RoomEvent,
    ) -> Result<(), MessagePushError> {
        self.events
            .lock()
            .await
            .push((connection_id.clone(), event.clone()));
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        event: &RoomEvent,
    ) -> Result<(), MessagePushError> {
        let mut events = self.events.lock().await;
        for target in targets {
            events.push((target, event.clone()));
        }
        Ok(())
    }
}

/// UseCase を組み立てるための依存一式
pub struct TestContext {
    pub store: Arc<dyn MessageStore>,
    pub presence: Arc<dyn PresenceRegistry>,
    pub pusher: Arc<RecordingMessagePusher>,
    pub clock: Arc<dyn Clock>,
}

impl TestContext {
    pub fn new() -> Self {
        let clock = fixed_clock();
        let store = Arc::new(InMemoryMessageStore::new(clock.clone()));
        Self::with_store(store, clock)
    }

    pub fn with_store(store: Arc<dyn MessageStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            presence: Arc::new(InMemoryPresenceRegistry::new()),
            pusher: Arc::new(RecordingMessagePusher::default()),
            clock,
        }
    }

    pub fn broadcaster(&self) -> RoomBroadcaster {
        RoomBroadcaster::new(self.presence.clone(), self.pusher.clone())
    }

    pub fn send_message(&self) -> SendMessageUseCase {
        SendMessageUseCase::new(
            self.store.clone(),
            self.presence.clone(),
            self.pusher.clone(),
            self.clock.clone(),
        )
    }

    pub fn mark_seen(&self) -> MarkSeenUseCase {
        MarkSeenUseCase::new(
            self.store.clone(),
            self.presence.clone(),
            self.pusher.clone(),
            self.clock.clone(),
        )
    }

    /// JoinRoomUseCase を通さずにコネクションをルームへ入れる
    pub async fn enter(&self, connection_id: &str, room_id: &str, user_id: &str) {
        self.presence
            .join(room(room_id), conn(connection_id), user(user_id))
            .await;
    }
}

pub fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock::new(NOW))
}

pub fn room(id: &str) -> RoomId {
    RoomId::new(id.to_string()).unwrap()
}

pub fn user(id: &str) -> UserId {
    UserId::new(id.to_string()).unwrap()
}

pub fn conn(id: &str) -> ConnectionId {
    ConnectionId::new(id.to_string()).unwrap()
}

/// display_name は user_id を大文字にしたもの
pub fn profile(id: &str) -> UserProfile {
    UserProfile::new(user(id), id.to_uppercase())
}
