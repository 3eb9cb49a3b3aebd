//! UseCase: メッセージ送信処理（ローカルエコーと確定の 2 段階）
//!
//! ## 流れ
//!
//! 1. 本文を検証する。空なら何も送らず `InvalidArgument`
//! 2. 一時 ID 付きのローカルエコーを送信者のコネクションにだけ送る
//! 3. 別タスクで MessageStore に永続化する（既読レシートは送信者自身のみ）
//! 4. 成功したら送信者に `message-confirmed`、ルームの他のコネクションに `new-message`
//! 5. 失敗したら送信者に `message-failed`。一時 ID はエコーしたものをそのまま使う
//!
//! エコーは永続化タスクを起動する前にチャンネルへ書き込まれるため、
//! 同じコネクション上では必ず確定・失敗の通知より先に届く。

use std::sync::Arc;

use hibiki_shared::time::Clock;
use tokio::task::JoinHandle;

use crate::domain::{
    ConnectionId, LocalEcho, Message, MessageBody, MessagePusher, MessageStore, PresenceRegistry,
    RoomEvent, RoomId, TempMessageId, Timestamp, UserProfile,
};

use super::{broadcast::RoomBroadcaster, error::ChatError};

/// 送信の最終結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Confirmed {
        temp_id: TempMessageId,
        message: Message,
    },
    Failed {
        temp_id: TempMessageId,
        error: ChatError,
    },
}

impl SendOutcome {
    pub fn temp_id(&self) -> &TempMessageId {
        match self {
            Self::Confirmed { temp_id, .. } | Self::Failed { temp_id, .. } => temp_id,
        }
    }
}

/// エコー済みで、永続化の完了を待っている送信
pub struct PendingSend {
    /// 送信者にすでに届けたローカルエコー
    pub echo: LocalEcho,
    completion: JoinHandle<SendOutcome>,
}

impl PendingSend {
    /// 永続化の完了を待つ
    pub async fn wait(self) -> SendOutcome {
        match self.completion.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(
                    "Reconcile task for '{}' did not complete: {}",
                    self.echo.temp_id,
                    e
                );
                SendOutcome::Failed {
                    temp_id: self.echo.temp_id,
                    error: ChatError::StoreUnavailable(e.to_string()),
                }
            }
        }
    }
}

/// メッセージ送信のユースケース
#[derive(Clone)]
pub struct SendMessageUseCase {
    /// MessageStore（永続化の抽象化）
    store: Arc<dyn MessageStore>,
    broadcaster: RoomBroadcaster,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
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

    /// メッセージ送信を実行
    ///
    /// ローカルエコーを送った時点で戻る。永続化は `PendingSend` の裏で進む。
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        room_id: RoomId,
        sender: UserProfile,
        body: String,
    ) -> Result<PendingSend, ChatError> {
        let echo = self.echo(&connection_id, room_id, sender, body).await?;

        let usecase = self.clone();
        let pending = echo.clone();
        let completion =
            tokio::spawn(async move { usecase.reconcile(&connection_id, pending).await });

        Ok(PendingSend { echo, completion })
    }

    /// 本文を検証し、送信者にローカルエコーを送る
    pub async fn echo(
        &self,
        connection_id: &ConnectionId,
        room_id: RoomId,
        sender: UserProfile,
        body: String,
    ) -> Result<LocalEcho, ChatError> {
        let body = MessageBody::new(body)?;
        let now = Timestamp::new(self.clock.now_millis());
        let echo = LocalEcho::new(room_id, sender, body, now);

        self.broadcaster
            .to_connection(connection_id, &RoomEvent::LocalEcho(echo.clone()))
            .await;
        tracing::debug!(
            "Echoed '{}' to connection '{}' in room '{}'",
            echo.temp_id,
            connection_id,
            echo.room_id
        );

        Ok(echo)
    }

    /// ローカルエコーを永続化し、結果を通知する
    pub async fn reconcile(&self, connection_id: &ConnectionId, echo: LocalEcho) -> SendOutcome {
        match self.store.create(echo.to_new_message()).await {
            Ok(message) => {
                self.broadcaster
                    .to_connection(
                        connection_id,
                        &RoomEvent::MessageConfirmed {
                            temp_id: echo.temp_id.clone(),
                            message: message.clone(),
                        },
                    )
                    .await;
                let targets = self
                    .broadcaster
                    .to_room_except(
                        &message.room_id,
                        connection_id,
                        &RoomEvent::NewMessage(message.clone()),
                    )
                    .await;
                tracing::info!(
                    "Message '{}' confirmed for '{}' and delivered to {} other connection(s)",
                    message.id,
                    echo.temp_id,
                    targets.len()
                );

                SendOutcome::Confirmed {
                    temp_id: echo.temp_id,
                    message,
                }
            }
            Err(e) => {
                tracing::warn!("Failed to persist '{}': {}", echo.temp_id, e);
                self.broadcaster
                    .to_connection(
                        connection_id,
                        &RoomEvent::MessageFailed {
                            temp_id: echo.temp_id.clone(),
                        },
                    )
                    .await;

                SendOutcome::Failed {
                    temp_id: echo.temp_id,
                    error: e.into(),
                }
            }
        }
    }
}
