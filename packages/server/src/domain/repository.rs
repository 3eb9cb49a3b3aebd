//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use std::collections::HashSet;

use async_trait::async_trait;

use super::{
    ConnectionId, Message, MessageId, MessageMutation, NewMessage, RoomId, StoreError, UserId,
};

/// メッセージの永続化ストア
///
/// ## 契約
///
/// - `create` は ID と作成日時を割り当てる。作成日時はルーム内で単調非減少
/// - `list_by_room` は作成日時の昇順で、最大 `limit` 件の最新メッセージを返す
/// - `update` は読み込みから書き込みまでアトミック。同じメッセージへの同時更新で
///   どちらの変更も失われない
/// - 失敗はすべて `StoreError::Unavailable`。ストア内部でリトライしない
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn create(&self, message: NewMessage) -> Result<Message, StoreError>;

    async fn list_by_room(&self, room_id: &RoomId, limit: usize)
    -> Result<Vec<Message>, StoreError>;

    async fn find_by_id(&self, id: &MessageId) -> Result<Option<Message>, StoreError>;

    /// 変更を適用し、更新後のメッセージを返す。存在しなければ `None`
    async fn update(
        &self,
        id: &MessageId,
        mutation: MessageMutation,
    ) -> Result<Option<UpdateOutcome>, StoreError>;

    /// 削除できた場合は `true`、存在しなければ `false`
    async fn delete_by_id(&self, id: &MessageId) -> Result<bool, StoreError>;

    /// ルーム内の全メッセージを削除し、削除件数を返す
    async fn delete_all_by_room(&self, room_id: &RoomId) -> Result<usize, StoreError>;
}

/// `MessageStore::update` の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// 更新後のメッセージ
    pub message: Message,
    /// 今回の変更で内容が変わったか（既読済みユーザーのレシートは `false`）
    pub changed: bool,
}

/// `PresenceRegistry::join` の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    /// 入室後のルームの接続数
    pub member_count: usize,
    /// 別のルームから移動してきた場合、そのルームと退室後の接続数
    pub previous_room: Option<(RoomId, usize)>,
}

/// ルームごとの在室コネクションを管理するレジストリ
///
/// 永続化しない。プロセス再起動で消え、クライアントの再接続で再構築される。
/// 1 つのコネクションは同時に高々 1 つのルームにしか所属しない。
#[async_trait]
pub trait PresenceRegistry: Send + Sync {
    /// コネクションをルームに登録する（同じコネクションの再入室は二重カウントしない）
    async fn join(
        &self,
        room_id: RoomId,
        connection_id: ConnectionId,
        user_id: UserId,
    ) -> JoinOutcome;

    /// コネクションを所属ルームから外す。所属していなければ `None`
    async fn leave(&self, connection_id: &ConnectionId) -> Option<(RoomId, usize)>;

    /// ルームに在室しているユーザー ID の集合
    async fn members_of(&self, room_id: &RoomId) -> HashSet<UserId>;

    /// ルームに在室しているコネクション ID
    async fn connections_in(&self, room_id: &RoomId) -> Vec<ConnectionId>;

    /// ルームの接続数
    async fn count(&self, room_id: &RoomId) -> usize;
}
