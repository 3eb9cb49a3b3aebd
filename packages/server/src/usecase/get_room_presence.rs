//! UseCase: ルームの在室状況取得

use std::sync::Arc;

use crate::domain::{PresenceRegistry, RoomId, UserId};

/// ルームの在室状況
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomPresence {
    pub room_id: RoomId,
    /// 接続数（同じユーザーの複数接続も数える）
    pub count: usize,
    /// 在室しているユーザー（ID の昇順）
    pub members: Vec<UserId>,
}

pub struct GetRoomPresenceUseCase {
    presence: Arc<dyn PresenceRegistry>,
}

impl GetRoomPresenceUseCase {
    pub fn new(presence: Arc<dyn PresenceRegistry>) -> Self {
        Self { presence }
    }

    pub async fn execute(&self, room_id: RoomId) -> RoomPresence {
        let count = self.presence.count(&room_id).await;
        let mut members: Vec<UserId> = self
            .presence
            .members_of(&room_id)
            .await
            .into_iter()
            .collect();
        members.sort();

        RoomPresence {
            room_id,
            count,
            members,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::test_support::{TestContext, room, user};

    #[tokio::test]
    async fn test_presence_lists_distinct_members() {
        // テスト項目: 接続数と重複のないメンバー一覧が返る
        // given (前提条件):
        let ctx = TestContext::new();
        ctx.enter("c1", "r1", "bob").await;
        ctx.enter("c2", "r1", "alice").await;
        ctx.enter("c3", "r1", "bob").await;
        let usecase = GetRoomPresenceUseCase::new(ctx.presence.clone());

        // when (操作):
        let presence = usecase.execute(room("r1")).await;

        // then (期待する結果):
        assert_eq!(presence.count, 3);
        assert_eq!(presence.members, vec![user("alice"), user("bob")]);
    }

    #[tokio::test]
    async fn test_unknown_room_is_empty() {
        // テスト項目: 誰もいないルームは 0 件
        // given (前提条件):
        let ctx = TestContext::new();
        let usecase = GetRoomPresenceUseCase::new(ctx.presence.clone());

        // when (操作):
        let presence = usecase.execute(room("nowhere")).await;

        // then (期待する結果):
        assert_eq!(presence.count, 0);
        assert!(presence.members.is_empty());
    }
}
