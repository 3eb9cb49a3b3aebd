//! ドメイン層
//!
//! チャットリレーのドメインモデル（Value Object, Entity, Event）と、
//! ドメイン層が必要とする外部への抽象（Repository, MessagePusher, PrivilegeOracle）を定義します。

pub mod entity;
pub mod error;
pub mod event;
pub mod message_pusher;
pub mod privilege;
pub mod repository;
pub mod value_object;

pub use entity::{LocalEcho, Message, MessageMutation, NewMessage, SeenReceipt, UserProfile};
pub use error::{MessagePushError, StoreError, ValueObjectError};
pub use event::RoomEvent;
pub use message_pusher::{MessagePusher, PusherChannel};
pub use privilege::PrivilegeOracle;
pub use repository::{JoinOutcome, MessageStore, PresenceRegistry, UpdateOutcome};
#[cfg(test)]
pub use repository::MockMessageStore;
pub use value_object::{
    ConnectionId, HISTORY_PAGE_SIZE, MessageBody, MessageId, RoomId, TempMessageId, Timestamp,
    UserId,
};
