//! Entity 定義

use super::value_object::{MessageBody, MessageId, RoomId, TempMessageId, Timestamp, UserId};

/// Identity Provider から受け取るユーザー情報
///
/// メッセージにはこのスナップショットが送信時点でコピーされる。
/// プロフィールが後から変わっても過去のメッセージには影響しない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user_id: UserId,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub accent_color: Option<String>,
}

impl UserProfile {
    pub fn new(user_id: UserId, display_name: String) -> Self {
        Self {
            user_id,
            display_name,
            avatar_url: None,
            accent_color: None,
        }
    }

    /// このユーザーが「今」メッセージを見たことを表す既読レシート
    pub fn receipt_at(&self, seen_at: Timestamp) -> SeenReceipt {
        SeenReceipt {
            user_id: self.user_id.clone(),
            display_name: self.display_name.clone(),
            seen_at,
        }
    }
}

/// 既読レシート
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenReceipt {
    pub user_id: UserId,
    pub display_name: String,
    pub seen_at: Timestamp,
}

/// 永続化済みメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub room_id: RoomId,
    pub sender: UserProfile,
    pub body: MessageBody,
    pub created_at: Timestamp,
    pub edited: bool,
    pub edited_at: Option<Timestamp>,
    /// 初めて見た順。同じ user_id のレシートは高々 1 件
    pub seen_by: Vec<SeenReceipt>,
}

impl Message {
    pub fn is_sent_by(&self, user_id: &UserId) -> bool {
        &self.sender.user_id == user_id
    }

    pub fn has_been_seen_by(&self, user_id: &UserId) -> bool {
        self.seen_by.iter().any(|r| &r.user_id == user_id)
    }

    pub fn seen_count(&self) -> usize {
        self.seen_by.len()
    }

    /// 変更を適用する
    ///
    /// 状態が変わった場合に `true` を返す。既読済みユーザーのレシート追加は何もしない。
    pub fn apply(&mut self, mutation: &MessageMutation) -> bool {
        match mutation {
            MessageMutation::Edit { body, edited_at } => {
                self.body = body.clone();
                self.edited = true;
                self.edited_at = Some(*edited_at);
                true
            }
            MessageMutation::AppendReceipt(receipt) => {
                if self.has_been_seen_by(&receipt.user_id) {
                    return false;
                }
                self.seen_by.push(receipt.clone());
                true
            }
        }
    }
}

/// MessageStore の `update` に渡す変更内容
///
/// ストアはこの変更を読み込みから書き込みまでアトミックに適用する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageMutation {
    /// 本文の編集
    Edit {
        body: MessageBody,
        edited_at: Timestamp,
    },
    /// 既読レシートの追加（重複はストア側で無視される）
    AppendReceipt(SeenReceipt),
}

/// 永続化前のメッセージ
///
/// ID と作成日時は MessageStore が割り当てる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub room_id: RoomId,
    pub sender: UserProfile,
    pub body: MessageBody,
    pub seen_by: Vec<SeenReceipt>,
}

impl NewMessage {
    pub fn into_message(self, id: MessageId, created_at: Timestamp) -> Message {
        Message {
            id,
            room_id: self.room_id,
            sender: self.sender,
            body: self.body,
            created_at,
            edited: false,
            edited_at: None,
            seen_by: self.seen_by,
        }
    }
}

/// ローカルエコー（送信者にだけ見える一時メッセージ）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalEcho {
    pub temp_id: TempMessageId,
    pub room_id: RoomId,
    pub sender: UserProfile,
    pub body: MessageBody,
    pub created_at: Timestamp,
    pub seen_by: Vec<SeenReceipt>,
}

impl LocalEcho {
    /// 送信者自身の既読レシートを付けたローカルエコーを作る
    pub fn new(room_id: RoomId, sender: UserProfile, body: MessageBody, now: Timestamp) -> Self {
        let seen_by = vec![sender.receipt_at(now)];
        Self {
            temp_id: TempMessageId::generate(),
            room_id,
            sender,
            body,
            created_at: now,
            seen_by,
        }
    }

    /// エコーと同じ内容（同じ初期レシート）で永続化用のメッセージを作る
    pub fn to_new_message(&self) -> NewMessage {
        NewMessage {
            room_id: self.room_id.clone(),
            sender: self.sender.clone(),
            body: self.body.clone(),
            seen_by: self.seen_by.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str) -> UserProfile {
        UserProfile::new(UserId::new(id.to_string()).unwrap(), id.to_uppercase())
    }

    fn message_from(sender: &UserProfile) -> Message {
        NewMessage {
            room_id: RoomId::new("r1".to_string()).unwrap(),
            sender: sender.clone(),
            body: MessageBody::new("hello".to_string()).unwrap(),
            seen_by: vec![sender.receipt_at(Timestamp::new(1000))],
        }
        .into_message(MessageId::generate(), Timestamp::new(1000))
    }

    #[test]
    fn test_append_receipt_is_idempotent_per_user() {
        // テスト項目: 同じユーザーのレシートは 2 回目以降追加されない
        // given (前提条件):
        let alice = profile("alice");
        let bob = profile("bob");
        let mut message = message_from(&alice);

        // when (操作):
        let first = message.apply(&MessageMutation::AppendReceipt(
            bob.receipt_at(Timestamp::new(2000)),
        ));
        let second = message.apply(&MessageMutation::AppendReceipt(
            bob.receipt_at(Timestamp::new(3000)),
        ));

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        assert_eq!(message.seen_count(), 2);
        assert_eq!(message.seen_by[1].seen_at, Timestamp::new(2000));
    }

    #[test]
    fn test_receipts_keep_first_seen_order() {
        // テスト項目: レシートは初めて見た順に並ぶ
        // given (前提条件):
        let alice = profile("alice");
        let mut message = message_from(&alice);

        // when (操作):
        for (name, at) in [("carol", 2000), ("bob", 2500), ("carol", 3000)] {
            message.apply(&MessageMutation::AppendReceipt(
                profile(name).receipt_at(Timestamp::new(at)),
            ));
        }

        // then (期待する結果):
        let order: Vec<&str> = message.seen_by.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(order, vec!["alice", "carol", "bob"]);
    }

    #[test]
    fn test_edit_sets_edited_flag_and_timestamp() {
        // テスト項目: 編集で本文・edited・edited_at が更新される
        // given (前提条件):
        let alice = profile("alice");
        let mut message = message_from(&alice);

        // when (操作):
        let changed = message.apply(&MessageMutation::Edit {
            body: MessageBody::new("bye".to_string()).unwrap(),
            edited_at: Timestamp::new(5000),
        });

        // then (期待する結果):
        assert!(changed);
        assert_eq!(message.body.as_str(), "bye");
        assert!(message.edited);
        assert_eq!(message.edited_at, Some(Timestamp::new(5000)));
        assert_eq!(message.created_at, Timestamp::new(1000));
    }

    #[test]
    fn test_local_echo_carries_sender_receipt() {
        // テスト項目: ローカルエコーは送信者自身のレシートを持ち、永続化用メッセージにも引き継がれる
        // given (前提条件):
        let alice = profile("alice");

        // when (操作):
        let echo = LocalEcho::new(
            RoomId::new("r1".to_string()).unwrap(),
            alice.clone(),
            MessageBody::new("hi".to_string()).unwrap(),
            Timestamp::new(42),
        );
        let new_message = echo.to_new_message();

        // then (期待する結果):
        assert_eq!(echo.seen_by, vec![alice.receipt_at(Timestamp::new(42))]);
        assert_eq!(new_message.seen_by, echo.seen_by);
        assert_eq!(new_message.body, echo.body);
    }
}
