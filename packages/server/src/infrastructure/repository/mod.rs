//! Repository の実装
//!
//! - `inmemory`: プロセス内のメモリを使った実装（在室情報、メッセージ）
//! - `sqlite`: SQLite を使ったメッセージの永続化

pub mod inmemory;
pub mod sqlite;

pub use inmemory::{InMemoryMessageStore, InMemoryPresenceRegistry};
pub use sqlite::{Database, SqliteMessageStore};
