//! UseCase 層
//!
//! ドメイン層の trait（MessageStore, PresenceRegistry, MessagePusher）を組み合わせて
//! チャットリレーの操作を実装します。

mod broadcast;
mod clear_room;
mod connect_client;
mod delete_message;
mod disconnect_client;
mod edit_message;
mod error;
mod get_room_history;
mod get_room_presence;
mod join_room;
mod mark_seen;
mod send_message;
mod typing;

#[cfg(test)]
mod test_support;

pub use broadcast::RoomBroadcaster;
pub use clear_room::ClearRoomUseCase;
pub use connect_client::ConnectClientUseCase;
pub use delete_message::DeleteMessageUseCase;
pub use disconnect_client::DisconnectClientUseCase;
pub use edit_message::EditMessageUseCase;
pub use error::ChatError;
pub use get_room_history::GetRoomHistoryUseCase;
pub use get_room_presence::{GetRoomPresenceUseCase, RoomPresence};
pub use join_room::JoinRoomUseCase;
pub use mark_seen::{MarkSeenOutcome, MarkSeenUseCase};
pub use send_message::{PendingSend, SendMessageUseCase, SendOutcome};
pub use typing::TypingRelayUseCase;
