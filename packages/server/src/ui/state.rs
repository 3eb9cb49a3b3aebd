//! Server state and use case wiring.

use std::sync::Arc;

use hibiki_shared::time::Clock;

use crate::{
    domain::{MessagePusher, MessageStore, PresenceRegistry, PrivilegeOracle},
    usecase::{
        ClearRoomUseCase, ConnectClientUseCase, DeleteMessageUseCase, DisconnectClientUseCase,
        EditMessageUseCase, GetRoomHistoryUseCase, GetRoomPresenceUseCase, JoinRoomUseCase,
        MarkSeenUseCase, SendMessageUseCase, TypingRelayUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// ConnectClientUseCase（クライアント接続のユースケース）
    pub connect_client_usecase: Arc<ConnectClientUseCase>,
    /// DisconnectClientUseCase（クライアント切断のユースケース）
    pub disconnect_client_usecase: Arc<DisconnectClientUseCase>,
    /// JoinRoomUseCase（ルーム入室のユースケース）
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// MarkSeenUseCase（既読のユースケース）
    pub mark_seen_usecase: Arc<MarkSeenUseCase>,
    pub edit_message_usecase: Arc<EditMessageUseCase>,
    pub delete_message_usecase: Arc<DeleteMessageUseCase>,
    pub clear_room_usecase: Arc<ClearRoomUseCase>,
    pub typing_relay_usecase: Arc<TypingRelayUseCase>,
    pub get_room_history_usecase: Arc<GetRoomHistoryUseCase>,
    pub get_room_presence_usecase: Arc<GetRoomPresenceUseCase>,
    /// PrivilegeOracle（モデレーター判定。呼び出しごとに評価する）
    pub privilege_oracle: Arc<dyn PrivilegeOracle>,
}

impl AppState {
    /// Wire every use case from the shared collaborators
    ///
    /// # Arguments
    ///
    /// * `store` - Durable message store
    /// * `presence` - Room presence registry owned by this process
    /// * `message_pusher` - Per-connection event delivery
    /// * `privilege_oracle` - Moderator check for delete / clear
    /// * `clock` - Time source for echoes, receipts and edits
    /// * `history_limit` - Number of messages sent on join and served over HTTP
    pub fn build(
        store: Arc<dyn MessageStore>,
        presence: Arc<dyn PresenceRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        privilege_oracle: Arc<dyn PrivilegeOracle>,
        clock: Arc<dyn Clock>,
        history_limit: usize,
    ) -> Self {
        let mark_seen_usecase = Arc::new(MarkSeenUseCase::new(
            store.clone(),
            presence.clone(),
            message_pusher.clone(),
            clock.clone(),
        ));

        Self {
            connect_client_usecase: Arc::new(ConnectClientUseCase::new(message_pusher.clone())),
            disconnect_client_usecase: Arc::new(DisconnectClientUseCase::new(
                presence.clone(),
                message_pusher.clone(),
            )),
            join_room_usecase: Arc::new(JoinRoomUseCase::new(
                presence.clone(),
                message_pusher.clone(),
                mark_seen_usecase.clone(),
                history_limit,
            )),
            send_message_usecase: Arc::new(SendMessageUseCase::new(
                store.clone(),
                presence.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            mark_seen_usecase,
            edit_message_usecase: Arc::new(EditMessageUseCase::new(
                store.clone(),
                presence.clone(),
                message_pusher.clone(),
                clock,
            )),
            delete_message_usecase: Arc::new(DeleteMessageUseCase::new(
                store.clone(),
                presence.clone(),
                message_pusher.clone(),
            )),
            clear_room_usecase: Arc::new(ClearRoomUseCase::new(
                store.clone(),
                presence.clone(),
                message_pusher.clone(),
            )),
            typing_relay_usecase: Arc::new(TypingRelayUseCase::new(
                presence.clone(),
                message_pusher,
            )),
            get_room_history_usecase: Arc::new(GetRoomHistoryUseCase::new(store, history_limit)),
            get_room_presence_usecase: Arc::new(GetRoomPresenceUseCase::new(presence)),
            privilege_oracle,
        }
    }
}
