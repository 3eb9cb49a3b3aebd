//! UseCase: メッセージ削除
//!
//! 送信者本人、またはモデレーター権限を持つ呼び出し元だけが削除できる。
//! 権限は呼び出しごとに渡され、キャッシュしない。

use std::sync::Arc;

use crate::domain::{MessageId, MessagePusher, MessageStore, PresenceRegistry, RoomEvent, UserId};

use super::{broadcast::RoomBroadcaster, error::ChatError};

pub struct DeleteMessageUseCase {
    store: Arc<dyn MessageStore>,
    broadcaster: RoomBroadcaster,
}

impl DeleteMessageUseCase {
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

    /// 削除を実行し、ルーム全体に `message-deleted` を送る
    ///
    /// 削除済みのメッセージに対する 2 回目の呼び出しは NotFound。
    pub async fn execute(
        &self,
        message_id: &MessageId,
        requester: &UserId,
        requester_is_privileged: bool,
    ) -> Result<(), ChatError> {
        let message = self
            .store
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| ChatError::message_not_found(message_id))?;

        if !message.is_sent_by(requester) && !requester_is_privileged {
            tracing::warn!(
                "User '{}' tried to delete message '{}' owned by '{}'",
                requester,
                message_id,
                message.sender.user_id
            );
            return Err(ChatError::Unauthorized(
                "only the sender or a moderator can delete a message".to_string(),
            ));
        }

        if !self.store.delete_by_id(message_id).await? {
            return Err(ChatError::message_not_found(message_id));
        }

        self.broadcaster
            .to_room(
                &message.room_id,
                &RoomEvent::MessageDeleted {
                    message_id: message.id.clone(),
                },
            )
            .await;
        tracing::info!(
            "Message '{}' deleted by '{}' (privileged: {})",
            message_id,
            requester,
            requester_is_privileged
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Message, MessageBody, MockMessageStore, NewMessage, StoreError, Timestamp};
    use crate::usecase::test_support::{NOW, TestContext, conn, fixed_clock, profile, room, user};

    async fn seed(ctx: &TestContext, sender: &str) -> Message {
        let sender = profile(sender);
        ctx.store
            .create(NewMessage {
                room_id: room("r1"),
                seen_by: vec![sender.receipt_at(Timestamp::new(NOW))],
                sender,
                body: MessageBody::new("hello".to_string()).unwrap(),
            })
            .await
            .unwrap()
    }

    fn create_usecase(ctx: &TestContext) -> DeleteMessageUseCase {
        DeleteMessageUseCase::new(ctx.store.clone(), ctx.presence.clone(), ctx.pusher.clone())
    }

    #[tokio::test]
    async fn test_owner_can_delete() {
        // テスト項目: 送信者本人は削除でき、ルーム全体に message-deleted が届く
        // given (前提条件):
        let ctx = TestContext::new();
        ctx.enter("c1", "r1", "alice").await;
        ctx.enter("c2", "r1", "bob").await;
        let message = seed(&ctx, "alice").await;
        let usecase = create_usecase(&ctx);

        // when (操作):
        let result = usecase.execute(&message.id, &user("alice"), false).await;

        // then (期待する結果):
        assert!(result.is_ok());
        let expected = RoomEvent::MessageDeleted {
            message_id: message.id.clone(),
        };
        assert_eq!(ctx.pusher.events_for(&conn("c1")).await, vec![expected.clone()]);
        assert_eq!(ctx.pusher.events_for(&conn("c2")).await, vec![expected]);
        assert_eq!(ctx.store.find_by_id(&message.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_privileged_caller_can_delete_others_message() {
        // テスト項目: モデレーターは他人のメッセージも削除できる
        // given (前提条件):
        let ctx = TestContext::new();
        let message = seed(&ctx, "alice").await;
        let usecase = create_usecase(&ctx);

        // when (操作):
        let result = usecase.execute(&message.id, &user("moderator"), true).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(ctx.store.find_by_id(&message.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_non_owner_without_privilege_is_unauthorized() {
        // テスト項目: 送信者でもモデレーターでもない呼び出しは Unauthorized でメッセージは残る
        // given (前提条件):
        let ctx = TestContext::new();
        ctx.enter("c1", "r1", "alice").await;
        let message = seed(&ctx, "alice").await;
        let usecase = create_usecase(&ctx);

        // when (操作):
        let result = usecase.execute(&message.id, &user("bob"), false).await;

        // then (期待する結果):
        assert!(matches!(result, Err(ChatError::Unauthorized(_))));
        assert!(ctx.store.find_by_id(&message.id).await.unwrap().is_some());
        assert!(ctx.pusher.events_for(&conn("c1")).await.is_empty());
    }

    #[tokio::test]
    async fn test_second_delete_is_not_found() {
        // テスト項目: 削除済みのメッセージをもう一度削除すると NotFound
        // given (前提条件):
        let ctx = TestContext::new();
        let message = seed(&ctx, "alice").await;
        let usecase = create_usecase(&ctx);
        usecase.execute(&message.id, &user("alice"), false).await.unwrap();

        // when (操作):
        let result = usecase.execute(&message.id, &user("alice"), false).await;

        // then (期待する結果):
        assert!(matches!(result, Err(ChatError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_store_failure_is_reported_without_broadcast() {
        // テスト項目: 削除時にストアが失敗すると StoreUnavailable を返し、何も送らない
        // given (前提条件):
        let healthy = TestContext::new();
        let message = seed(&healthy, "alice").await;

        let mut store = MockMessageStore::new();
        let found = message.clone();
        store
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        store
            .expect_delete_by_id()
            .returning(|_| Err(StoreError::Unavailable("down".to_string())));
        let ctx = TestContext::with_store(Arc::new(store), fixed_clock());
        ctx.enter("c1", "r1", "alice").await;
        ctx.enter("c2", "r1", "bob").await;
        let usecase = create_usecase(&ctx);

        // when (操作):
        let result = usecase.execute(&message.id, &user("alice"), false).await;

        // then (期待する結果):
        assert_eq!(result, Err(ChatError::StoreUnavailable("down".to_string())));
        assert!(ctx.pusher.events_for(&conn("c1")).await.is_empty());
        assert!(ctx.pusher.events_for(&conn("c2")).await.is_empty());
    }
}
