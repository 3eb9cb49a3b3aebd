//! SQLite MessageStore 実装
//!
//! 既読レシートは JSON 配列として `seen_by` カラムに保存します。
//! `update` は接続のロックを保持したままトランザクション内で読み込み・適用・書き込みを行うため、
//! 同じメッセージへの同時更新が失われることはありません。

use std::sync::Arc;

use async_trait::async_trait;
use hibiki_shared::time::Clock;
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};

use super::Database;
use crate::domain::{
    Message, MessageBody, MessageId, MessageMutation, MessageStore, NewMessage, RoomId,
    SeenReceipt, StoreError, Timestamp, UpdateOutcome, UserId, UserProfile, ValueObjectError,
};

const SELECT_COLUMNS: &str = "id, room_id, sender_id, sender_display_name, sender_avatar_url, \
     sender_accent_color, body, created_at, edited, edited_at, seen_by";

/// SQLite の行（DB 層の表現）
struct MessageRow {
    id: String,
    room_id: String,
    sender_id: String,
    sender_display_name: String,
    sender_avatar_url: Option<String>,
    sender_accent_color: Option<String>,
    body: String,
    created_at: i64,
    edited: bool,
    edited_at: Option<i64>,
    seen_by: String,
}

#[derive(Serialize, Deserialize)]
struct SeenReceiptRow {
    user_id: String,
    display_name: String,
    seen_at: i64,
}

impl MessageRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            room_id: row.get(1)?,
            sender_id: row.get(2)?,
            sender_display_name: row.get(3)?,
            sender_avatar_url: row.get(4)?,
            sender_accent_color: row.get(5)?,
            body: row.get(6)?,
            created_at: row.get(7)?,
            edited: row.get(8)?,
            edited_at: row.get(9)?,
            seen_by: row.get(10)?,
        })
    }

    fn into_message(self) -> Result<Message, StoreError> {
        let corrupt = |e: &dyn std::fmt::Display| {
            StoreError::Unavailable(format!("corrupt message row '{}': {}", self.id, e))
        };

        let receipts: Vec<SeenReceiptRow> =
            serde_json::from_str(&self.seen_by).map_err(|e| corrupt(&e))?;
        let seen_by = receipts
            .into_iter()
            .map(|r| -> Result<SeenReceipt, ValueObjectError> {
                Ok(SeenReceipt {
                    user_id: UserId::new(r.user_id)?,
                    display_name: r.display_name,
                    seen_at: Timestamp::new(r.seen_at),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| corrupt(&e))?;

        Ok(Message {
            id: MessageId::new(self.id.clone()).map_err(|e| corrupt(&e))?,
            room_id: RoomId::new(self.room_id.clone()).map_err(|e| corrupt(&e))?,
            sender: UserProfile {
                user_id: UserId::new(self.sender_id.clone()).map_err(|e| corrupt(&e))?,
                display_name: self.sender_display_name.clone(),
                avatar_url: self.sender_avatar_url.clone(),
                accent_color: self.sender_accent_color.clone(),
            },
            body: MessageBody::new(self.body.clone()).map_err(|e| corrupt(&e))?,
            created_at: Timestamp::new(self.created_at),
            edited: self.edited,
            edited_at: self.edited_at.map(Timestamp::new),
            seen_by,
        })
    }
}

fn encode_receipts(receipts: &[SeenReceipt]) -> Result<String, StoreError> {
    let rows: Vec<SeenReceiptRow> = receipts
        .iter()
        .map(|r| SeenReceiptRow {
            user_id: r.user_id.as_str().to_string(),
            display_name: r.display_name.clone(),
            seen_at: r.seen_at.value(),
        })
        .collect();
    serde_json::to_string(&rows)
        .map_err(|e| StoreError::Unavailable(format!("failed to encode receipts: {}", e)))
}

fn query_message(conn: &Connection, id: &str) -> Result<Option<Message>, StoreError> {
    let sql = format!("SELECT {} FROM messages WHERE id = ?1", SELECT_COLUMNS);
    let row = conn
        .query_row(&sql, [id], MessageRow::from_row)
        .optional()?;
    row.map(MessageRow::into_message).transpose()
}

/// SQLite MessageStore 実装
pub struct SqliteMessageStore {
    db: Arc<Database>,
    clock: Arc<dyn Clock>,
}

impl SqliteMessageStore {
    pub fn new(db: Arc<Database>, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Run blocking DB work off the async runtime
    async fn run<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || db.with_conn(f))
            .await
            .map_err(|e| StoreError::Unavailable(format!("spawn_blocking join error: {}", e)))?
    }
}

#[async_trait]
impl MessageStore for SqliteMessageStore {
    async fn create(&self, message: NewMessage) -> Result<Message, StoreError> {
        let now = self.clock.now_millis();
        self.run(move |conn| {
            let tx = conn.transaction()?;

            let latest: Option<i64> = tx.query_row(
                "SELECT MAX(created_at) FROM messages WHERE room_id = ?1",
                [message.room_id.as_str()],
                |row| row.get(0),
            )?;
            let created_at = latest.map_or(now, |latest| latest.max(now));

            let message = message.into_message(MessageId::generate(), Timestamp::new(created_at));
            tx.execute(
                "INSERT INTO messages (id, room_id, sender_id, sender_display_name, sender_avatar_url, \
                 sender_accent_color, body, created_at, seen_by) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    message.id.as_str(),
                    message.room_id.as_str(),
                    message.sender.user_id.as_str(),
                    message.sender.display_name,
                    message.sender.avatar_url,
                    message.sender.accent_color,
                    message.body.as_str(),
                    message.created_at.value(),
                    encode_receipts(&message.seen_by)?,
                ],
            )?;
            tx.commit()?;

            Ok(message)
        })
        .await
    }

    async fn list_by_room(
        &self,
        room_id: &RoomId,
        limit: usize,
    ) -> Result<Vec<Message>, StoreError> {
        let room_id = room_id.as_str().to_string();
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.run(move |conn| {
            // Newest `limit` rows, returned oldest first
            let sql = format!(
                "SELECT {cols} FROM (
                     SELECT {cols}, seq FROM messages
                     WHERE room_id = ?1
                     ORDER BY created_at DESC, seq DESC
                     LIMIT ?2
                 )
                 ORDER BY created_at ASC, seq ASC",
                cols = SELECT_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![room_id, limit], MessageRow::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            rows.into_iter().map(MessageRow::into_message).collect()
        })
        .await
    }

    async fn find_by_id(&self, id: &MessageId) -> Result<Option<Message>, StoreError> {
        let id = id.as_str().to_string();
        self.run(move |conn| query_message(conn, &id)).await
    }

    async fn update(
        &self,
        id: &MessageId,
        mutation: MessageMutation,
    ) -> Result<Option<UpdateOutcome>, StoreError> {
        let id = id.as_str().to_string();
        self.run(move |conn| {
            let tx = conn.transaction()?;

            let Some(mut message) = query_message(&tx, &id)? else {
                return Ok(None);
            };

            let changed = message.apply(&mutation);
            if changed {
                tx.execute(
                    "UPDATE messages SET body = ?2, edited = ?3, edited_at = ?4, seen_by = ?5 \
                     WHERE id = ?1",
                    params![
                        id,
                        message.body.as_str(),
                        message.edited,
                        message.edited_at.map(|t| t.value()),
                        encode_receipts(&message.seen_by)?,
                    ],
                )?;
            }
            tx.commit()?;

            Ok(Some(UpdateOutcome { message, changed }))
        })
        .await
    }

    async fn delete_by_id(&self, id: &MessageId) -> Result<bool, StoreError> {
        let id = id.as_str().to_string();
        self.run(move |conn| {
            let affected = conn.execute("DELETE FROM messages WHERE id = ?1", [id])?;
            Ok(affected > 0)
        })
        .await
    }

    async fn delete_all_by_room(&self, room_id: &RoomId) -> Result<usize, StoreError> {
        let room_id = room_id.as_str().to_string();
        self.run(move |conn| {
            let affected = conn.execute("DELETE FROM messages WHERE room_id = ?1", [room_id])?;
            Ok(affected)
        })
        .await
    }
}
