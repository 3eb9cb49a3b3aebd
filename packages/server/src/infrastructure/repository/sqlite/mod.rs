//! SQLite による永続化
//!
//! rusqlite の `Connection` は同期 API のため、`Mutex` で保護した上で
//! `tokio::task::spawn_blocking` から呼び出します。

mod message;
mod migrations;

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use crate::domain::StoreError;

pub use message::SqliteMessageStore;

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

/// SQLite データベース
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// ファイルを開き（なければ作成し）、マイグレーションを実行する
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;
        migrations::run(&conn)?;

        tracing::info!("Database opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// テスト用のインメモリデータベース
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// 接続をロックしてクロージャを実行する
    ///
    /// ロックを保持している間は他の呼び出しが割り込まないため、
    /// クロージャ内の読み込みから書き込みまでがアトミックになる。
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("DB lock poisoned: {}", e)))?;
        f(&mut conn)
    }
}
