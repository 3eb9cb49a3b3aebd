//! UseCase: ルーム入室処理
//!
//! 1. PresenceRegistry に登録（別のルームにいた場合はそこから外れる）
//! 2. 元のルームと入室したルームに接続数を通知
//! 3. 直近の履歴の既読反映（追加したレシートごとに `seen-update`）
//! 4. 反映後の履歴を入室したコネクションにだけ送る

use std::sync::Arc;

use crate::domain::{
    ConnectionId, JoinOutcome, MessagePusher, PresenceRegistry, RoomEvent, RoomId, UserProfile,
};

use super::{broadcast::RoomBroadcaster, error::ChatError, mark_seen::MarkSeenUseCase};

pub struct JoinRoomUseCase {
    presence: Arc<dyn PresenceRegistry>,
    mark_seen: Arc<MarkSeenUseCase>,
    broadcaster: RoomBroadcaster,
    /// 入室時に送る履歴の件数
    history_limit: usize,
}

impl JoinRoomUseCase {
    pub fn new(
        presence: Arc<dyn PresenceRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        mark_seen: Arc<MarkSeenUseCase>,
        history_limit: usize,
    ) -> Self {
        Self {
            broadcaster: RoomBroadcaster::new(presence.clone(), message_pusher),
            presence,
            mark_seen,
            history_limit,
        }
    }

    /// 入室を実行
    ///
    /// 既読反映に失敗した場合でも在室登録は取り消さない。
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        room_id: RoomId,
        viewer: &UserProfile,
    ) -> Result<JoinOutcome, ChatError> {
        let outcome = self
            .presence
            .join(
                room_id.clone(),
                connection_id.clone(),
                viewer.user_id.clone(),
            )
            .await;

        if let Some((previous, count)) = &outcome.previous_room {
            self.broadcaster
                .to_room(
                    previous,
                    &RoomEvent::PresenceCount {
                        room_id: previous.clone(),
                        count: *count,
                    },
                )
                .await;
        }
        self.broadcaster
            .to_room(
                &room_id,
                &RoomEvent::PresenceCount {
                    room_id: room_id.clone(),
                    count: outcome.member_count,
                },
            )
            .await;

        tracing::info!(
            "User '{}' joined room '{}' via '{}' ({} connected)",
            viewer.user_id,
            room_id,
            connection_id,
            outcome.member_count
        );

        let messages = self
            .mark_seen
            .backfill_on_join(&room_id, viewer, self.history_limit)
            .await?;
        self.broadcaster
            .to_connection(connection_id, &RoomEvent::RoomHistory { room_id, messages })
            .await;

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MockMessageStore, StoreError};
    use crate::usecase::test_support::{TestContext, conn, fixed_clock, profile, room};

    fn create_usecase(ctx: &TestContext) -> JoinRoomUseCase {
        JoinRoomUseCase::new(
            ctx.presence.clone(),
            ctx.pusher.clone(),
            Arc::new(ctx.mark_seen()),
            100,
        )
    }

    #[tokio::test]
    async fn test_join_broadcasts_count_and_sends_history_to_joiner() {
        // テスト項目: 入室するとルーム全体に接続数が届き、入室者にだけ履歴が届く
        // given (前提条件):
        let ctx = TestContext::new();
        ctx.enter("c1", "r1", "alice").await;
        let usecase = create_usecase(&ctx);

        // when (操作):
        let outcome = usecase
            .execute(&conn("c2"), room("r1"), &profile("bob"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(outcome.member_count, 2);
        let count = RoomEvent::PresenceCount {
            room_id: room("r1"),
            count: 2,
        };
        assert_eq!(ctx.pusher.events_for(&conn("c1")).await, vec![count.clone()]);
        assert_eq!(
            ctx.pusher.events_for(&conn("c2")).await,
            vec![
                count,
                RoomEvent::RoomHistory {
                    room_id: room("r1"),
                    messages: vec![],
                }
            ]
        );
    }

    #[tokio::test]
    async fn test_switching_rooms_updates_both_counts() {
        // テスト項目: 別のルームへ移ると元のルームにも新しい接続数が届く
        // given (前提条件):
        let ctx = TestContext::new();
        let usecase = create_usecase(&ctx);
        usecase
            .execute(&conn("c1"), room("r1"), &profile("alice"))
            .await
            .unwrap();
        usecase
            .execute(&conn("c2"), room("r1"), &profile("bob"))
            .await
            .unwrap();
        ctx.pusher.clear().await;

        // when (操作):
        let outcome = usecase
            .execute(&conn("c1"), room("r2"), &profile("alice"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(outcome.previous_room, Some((room("r1"), 1)));
        assert_eq!(
            ctx.pusher.events_for(&conn("c2")).await,
            vec![RoomEvent::PresenceCount {
                room_id: room("r1"),
                count: 1,
            }]
        );
    }

    #[tokio::test]
    async fn test_backfill_failure_keeps_presence() {
        // テスト項目: 履歴の取得に失敗してもエラーを返すだけで在室登録は残る
        // given (前提条件):
        let mut store = MockMessageStore::new();
        store
            .expect_list_by_room()
            .returning(|_, _| Err(StoreError::Unavailable("timeout".to_string())));
        let ctx = TestContext::with_store(Arc::new(store), fixed_clock());
        let usecase = create_usecase(&ctx);

        // when (操作):
        let result = usecase
            .execute(&conn("c1"), room("r1"), &profile("alice"))
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(ChatError::StoreUnavailable(_))));
        assert_eq!(
            ctx.presence.connections_in(&room("r1")).await,
            vec![conn("c1")]
        );
    }
}
