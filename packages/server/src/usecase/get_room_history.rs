//! UseCase: ルームのメッセージ履歴取得

use std::sync::Arc;

use crate::domain::{HISTORY_PAGE_SIZE, Message, MessageStore, RoomId};

use super::error::ChatError;

pub struct GetRoomHistoryUseCase {
    store: Arc<dyn MessageStore>,
    /// 1 回に返す最大件数（`HISTORY_PAGE_SIZE` 以下）
    history_limit: usize,
}

impl GetRoomHistoryUseCase {
    pub fn new(store: Arc<dyn MessageStore>, history_limit: usize) -> Self {
        Self {
            store,
            history_limit: history_limit.min(HISTORY_PAGE_SIZE),
        }
    }

    /// 直近のメッセージを作成日時の昇順で返す
    ///
    /// `limit` は設定された上限で切り詰める。
    pub async fn execute(
        &self,
        room_id: &RoomId,
        limit: Option<usize>,
    ) -> Result<Vec<Message>, ChatError> {
        let limit = limit.map_or(self.history_limit, |l| l.min(self.history_limit));
        Ok(self.store.list_by_room(room_id, limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessageBody, NewMessage};
    use crate::usecase::test_support::{TestContext, profile, room};

    async fn seed(ctx: &TestContext, count: usize) {
        for i in 0..count {
            ctx.store
                .create(NewMessage {
                    room_id: room("r1"),
                    sender: profile("alice"),
                    body: MessageBody::new(format!("message {}", i)).unwrap(),
                    seen_by: vec![],
                })
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_history_is_capped_at_page_size() {
        // テスト項目: 上限を超える件数を要求しても最新の 100 件までしか返らない
        // given (前提条件):
        let ctx = TestContext::new();
        seed(&ctx, 105).await;
        let usecase = GetRoomHistoryUseCase::new(ctx.store.clone(), 500);

        // when (操作):
        let history = usecase.execute(&room("r1"), Some(1000)).await.unwrap();

        // then (期待する結果):
        assert_eq!(history.len(), HISTORY_PAGE_SIZE);
        assert_eq!(history[0].body.as_str(), "message 5");
        assert_eq!(history[99].body.as_str(), "message 104");
    }

    #[tokio::test]
    async fn test_history_respects_smaller_limit() {
        // テスト項目: 指定した件数が上限より小さければその件数だけ返る
        // given (前提条件):
        let ctx = TestContext::new();
        seed(&ctx, 10).await;
        let usecase = GetRoomHistoryUseCase::new(ctx.store.clone(), 100);

        // when (操作):
        let history = usecase.execute(&room("r1"), Some(3)).await.unwrap();

        // then (期待する結果):
        let bodies: Vec<&str> = history.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["message 7", "message 8", "message 9"]);
    }
}
