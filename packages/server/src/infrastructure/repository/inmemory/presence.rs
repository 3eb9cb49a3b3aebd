//! InMemory PresenceRegistry 実装
//!
//! ルームごとの在室コネクションを HashMap で保持します。
//! join / leave は単一の Mutex の中で行うため、同じルームへの同時入退室でも整合性が保たれます。

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, JoinOutcome, PresenceRegistry, RoomId, UserId};

#[derive(Debug, Default)]
struct PresenceState {
    /// room_id -> (connection_id -> user_id)
    rooms: HashMap<RoomId, HashMap<ConnectionId, UserId>>,
    /// connection_id -> room_id（逆引き。1 コネクションは高々 1 ルーム）
    connections: HashMap<ConnectionId, RoomId>,
}

impl PresenceState {
    fn count(&self, room_id: &RoomId) -> usize {
        self.rooms.get(room_id).map_or(0, HashMap::len)
    }

    /// コネクションを所属ルームから外し、そのルームと残りの接続数を返す
    fn detach(&mut self, connection_id: &ConnectionId) -> Option<(RoomId, usize)> {
        let room_id = self.connections.remove(connection_id)?;
        if let Some(members) = self.rooms.get_mut(&room_id) {
            members.remove(connection_id);
            if members.is_empty() {
                self.rooms.remove(&room_id);
            }
        }
        let count = self.count(&room_id);
        Some((room_id, count))
    }
}

/// インメモリ PresenceRegistry 実装
///
/// プロセスの起動時に生成され、終了時に破棄される。永続化はしない。
#[derive(Debug, Default)]
pub struct InMemoryPresenceRegistry {
    state: Mutex<PresenceState>,
}

impl InMemoryPresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PresenceRegistry for InMemoryPresenceRegistry {
    async fn join(
        &self,
        room_id: RoomId,
        connection_id: ConnectionId,
        user_id: UserId,
    ) -> JoinOutcome {
        let mut state = self.state.lock().await;

        let switching = state
            .connections
            .get(&connection_id)
            .is_some_and(|current| current != &room_id);
        let previous_room = if switching {
            state.detach(&connection_id)
        } else {
            None
        };

        state
            .connections
            .insert(connection_id.clone(), room_id.clone());
        state
            .rooms
            .entry(room_id.clone())
            .or_default()
            .insert(connection_id.clone(), user_id);

        let member_count = state.count(&room_id);
        tracing::debug!(
            "Connection '{}' joined room '{}' ({} connected)",
            connection_id,
            room_id,
            member_count
        );

        JoinOutcome {
            member_count,
            previous_room,
        }
    }

    async fn leave(&self, connection_id: &ConnectionId) -> Option<(RoomId, usize)> {
        let mut state = self.state.lock().await;
        let left = state.detach(connection_id);
        if let Some((room_id, count)) = &left {
            tracing::debug!(
                "Connection '{}' left room '{}' ({} connected)",
                connection_id,
                room_id,
                count
            );
        }
        left
    }

    async fn members_of(&self, room_id: &RoomId) -> HashSet<UserId> {
        let state = self.state.lock().await;
        state
            .rooms
            .get(room_id)
            .map(|members| members.values().cloned().collect())
            .unwrap_or_default()
    }

    async fn connections_in(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        let state = self.state.lock().await;
        let mut connections: Vec<ConnectionId> = state
            .rooms
            .get(room_id)
            .map(|members| members.keys().cloned().collect())
            .unwrap_or_default();
        connections.sort();
        connections
    }

    async fn count(&self, room_id: &RoomId) -> usize {
        self.state.lock().await.count(room_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_join_returns_member_count() {
        // テスト項目: 入室するとルームの接続数が返る
        // given (前提条件):
        let registry = InMemoryPresenceRegistry::new();

        // when (操作):
        let first = registry.join(room("r1"), conn("c1"), user("alice")).await;
        let second = registry.join(room("r1"), conn("c2"), user("bob")).await;

        // then (期待する結果):
        assert_eq!(first.member_count, 1);
        assert_eq!(second.member_count, 2);
        assert_eq!(second.previous_room, None);
    }

    #[tokio::test]
    async fn test_rejoin_same_room_does_not_double_count() {
        // テスト項目: 同じコネクションの再入室は二重カウントせず、ユーザーを置き換える
        // given (前提条件):
        let registry = InMemoryPresenceRegistry::new();
        registry.join(room("r1"), conn("c1"), user("alice")).await;

        // when (操作):
        let outcome = registry.join(room("r1"), conn("c1"), user("alice2")).await;

        // then (期待する結果):
        assert_eq!(outcome.member_count, 1);
        let members = registry.members_of(&room("r1")).await;
        assert_eq!(members, HashSet::from([user("alice2")]));
    }

    #[tokio::test]
    async fn test_switching_rooms_leaves_previous_room() {
        // テスト項目: 別のルームに入室すると元のルームから外れる
        // given (前提条件):
        let registry = InMemoryPresenceRegistry::new();
        registry.join(room("r1"), conn("c1"), user("alice")).await;
        registry.join(room("r1"), conn("c2"), user("bob")).await;

        // when (操作):
        let outcome = registry.join(room("r2"), conn("c1"), user("alice")).await;

        // then (期待する結果):
        assert_eq!(outcome.member_count, 1);
        assert_eq!(outcome.previous_room, Some((room("r1"), 1)));
        assert_eq!(registry.count(&room("r1")).await, 1);
        assert_eq!(registry.connections_in(&room("r2")).await, vec![conn("c1")]);
        assert_eq!(registry.connections_in(&room("r1")).await, vec![conn("c2")]);
    }

    #[tokio::test]
    async fn test_leave_returns_room_and_remaining_count() {
        // テスト項目: 退室すると所属していたルームと残りの接続数が返る
        // given (前提条件):
        let registry = InMemoryPresenceRegistry::new();
        registry.join(room("r1"), conn("c1"), user("alice")).await;
        registry.join(room("r1"), conn("c2"), user("bob")).await;

        // when (操作):
        let left = registry.leave(&conn("c1")).await;

        // then (期待する結果):
        assert_eq!(left, Some((room("r1"), 1)));
        assert_eq!(registry.connections_in(&room("r1")).await, vec![conn("c2")]);
    }

    #[tokio::test]
    async fn test_leave_untracked_connection_returns_none() {
        // テスト項目: 登録されていないコネクションの退室は None
        // given (前提条件):
        let registry = InMemoryPresenceRegistry::new();

        // when (操作):
        let left = registry.leave(&conn("ghost")).await;

        // then (期待する結果):
        assert_eq!(left, None);
    }

    #[tokio::test]
    async fn test_count_after_joins_and_disconnects() {
        // テスト項目: N 接続が入室し M 接続が切断すると接続数は N - M
        // given (前提条件):
        let registry = InMemoryPresenceRegistry::new();
        let n = 7;
        let m = 3;
        for i in 0..n {
            registry
                .join(room("r1"), conn(&format!("c{}", i)), user(&format!("u{}", i)))
                .await;
        }

        // when (操作):
        for i in 0..m {
            registry.leave(&conn(&format!("c{}", i))).await;
        }

        // then (期待する結果):
        assert_eq!(registry.count(&room("r1")).await, n - m);
    }

    #[tokio::test]
    async fn test_members_of_deduplicates_users_with_multiple_connections() {
        // テスト項目: 同じユーザーの複数コネクションは members_of で 1 人として数える
        // given (前提条件):
        let registry = InMemoryPresenceRegistry::new();
        registry.join(room("r1"), conn("c1"), user("alice")).await;
        registry.join(room("r1"), conn("c2"), user("alice")).await;

        // when (操作):
        let members = registry.members_of(&room("r1")).await;

        // then (期待する結果):
        assert_eq!(members.len(), 1);
        assert_eq!(registry.count(&room("r1")).await, 2);
    }
}
