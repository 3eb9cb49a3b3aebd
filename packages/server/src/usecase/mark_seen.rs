//! UseCase: 既読レシートの集約
//!
//! 1 ユーザーにつき 1 メッセージあたり高々 1 件のレシートを記録します。
//! 重複の排除は MessageStore の `update` の中（アトミックな読み込み〜書き込み）で行われます。

use std::sync::Arc;

use hibiki_shared::time::Clock;

use crate::domain::{
    Message, MessageId, MessageMutation, MessagePusher, MessageStore, PresenceRegistry, RoomEvent,
    RoomId, Timestamp, UserProfile,
};

use super::{broadcast::RoomBroadcaster, error::ChatError};

/// `mark_seen` の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkSeenOutcome {
    /// レシート追加後（または既読済みの場合は現在）のメッセージ
    pub message: Message,
    /// 今回の呼び出しでレシートが追加されたか
    pub appended: bool,
}

pub struct MarkSeenUseCase {
    store: Arc<dyn MessageStore>,
    broadcaster: RoomBroadcaster,
    clock: Arc<dyn Clock>,
}

impl MarkSeenUseCase {
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

    /// 既読レシートを記録し、追加された場合はルーム全体に `seen-update` を送る
    pub async fn execute(
        &self,
        message_id: &MessageId,
        viewer: &UserProfile,
    ) -> Result<MarkSeenOutcome, ChatError> {
        let outcome = self.mark_seen(message_id, viewer).await?;

        if outcome.appended {
            self.broadcaster
                .to_room(
                    &outcome.message.room_id,
                    &RoomEvent::SeenUpdate {
                        message_id: outcome.message.id.clone(),
                        seen_by: outcome.message.seen_by.clone(),
                    },
                )
                .await;
        }

        Ok(outcome)
    }

    /// 既読レシートを記録する（配信はしない）
    ///
    /// すでに既読なら何もせず `appended = false` を返す。
    pub async fn mark_seen(
        &self,
        message_id: &MessageId,
        viewer: &UserProfile,
    ) -> Result<MarkSeenOutcome, ChatError> {
        let message = self
            .store
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| ChatError::message_not_found(message_id))?;

        if message.has_been_seen_by(&viewer.user_id) {
            return Ok(MarkSeenOutcome {
                message,
                appended: false,
            });
        }

        let receipt = viewer.receipt_at(Timestamp::new(self.clock.now_millis()));
        let updated = self
            .store
            .update(message_id, MessageMutation::AppendReceipt(receipt))
            .await?
            .ok_or_else(|| ChatError::message_not_found(message_id))?;

        // 同時に別の呼び出しが先にレシートを追加していた場合、ストアは今回の分を捨てる
        let appended = updated.changed;
        let updated = updated.message;
        if appended {
            tracing::debug!(
                "User '{}' has seen message '{}' ({} seen)",
                viewer.user_id,
                message_id,
                updated.seen_count()
            );
        }

        Ok(MarkSeenOutcome {
            message: updated,
            appended,
        })
    }

    /// 入室時の既読反映
    ///
    /// 直近 `limit` 件のうち、まだ見ていないメッセージすべてにレシートを付けて
    /// それぞれ `seen-update` を送る。反映後の履歴を返す。
    pub async fn backfill_on_join(
        &self,
        room_id: &RoomId,
        viewer: &UserProfile,
        limit: usize,
    ) -> Result<Vec<Message>, ChatError> {
        let history = self.store.list_by_room(room_id, limit).await?;
        let mut refreshed = Vec::with_capacity(history.len());
        let mut appended = 0;

        for message in history {
            if message.has_been_seen_by(&viewer.user_id) {
                refreshed.push(message);
                continue;
            }
            match self.execute(&message.id, viewer).await {
                Ok(outcome) => {
                    if outcome.appended {
                        appended += 1;
                    }
                    refreshed.push(outcome.message);
                }
                // 履歴の取得後に削除されたメッセージは飛ばす
                Err(ChatError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }

        tracing::debug!(
            "Back-filled {} receipt(s) for '{}' in room '{}'",
            appended,
            viewer.user_id,
            room_id
        );

        Ok(refreshed)
    }
}
