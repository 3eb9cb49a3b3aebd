//! UseCase: クライアント接続処理

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, PusherChannel};

/// クライアント接続のユースケース
///
/// コネクションを MessagePusher に登録するだけで、どのルームにも入らない。
/// ルームへの入室は `join-room` を受け取った時点で `JoinRoomUseCase` が行う。
pub struct ConnectClientUseCase {
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectClientUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// 接続を実行
    ///
    /// # Arguments
    ///
    /// * `connection_id` - 新しく払い出したコネクション ID
    /// * `sender` - このコネクション宛てのイベントを書き込むチャンネル
    pub async fn execute(&self, connection_id: ConnectionId, sender: PusherChannel) {
        self.message_pusher
            .register_client(connection_id, sender)
            .await;
    }
}
