//! MessagePusher trait 定義
//!
//! クライアントへのイベント通知の抽象。WebSocket 以外の手段（pub/sub など）に
//! 差し替えられるよう、ドメイン層がインターフェースを定義します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError, RoomEvent};

/// コネクションごとの送信チャンネル（シリアライズ済み JSON を運ぶ）
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// コネクションを登録
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// コネクションを登録解除
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// 特定のコネクションにイベントを送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &RoomEvent,
    ) -> Result<(), MessagePushError>;

    /// 複数のコネクションにイベントを送信
    ///
    /// 一部の送信失敗は許容する（遅い・切断済みの受信者が送信者を止めない）。
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        event: &RoomEvent,
    ) -> Result<(), MessagePushError>;
}
