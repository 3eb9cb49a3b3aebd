//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{StoreError, ValueObjectError};

/// チャット操作のエラー
///
/// `InvalidArgument` / `NotFound` / `Unauthorized` は呼び出し元にだけ返し、
/// ルームへのブロードキャストは行わない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    /// 空の本文や不正な ID など。副作用が起きる前に拒否する
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// メッセージが存在しない
    #[error("not found: {0}")]
    NotFound(String),

    /// 所有者でもモデレーターでもない
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// MessageStore の呼び出しが失敗した
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl ChatError {
    /// ワイヤーフォーマットで使うエラーコード
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::NotFound(_) => "not_found",
            Self::Unauthorized(_) => "unauthorized",
            Self::StoreUnavailable(_) => "store_unavailable",
        }
    }

    pub(crate) fn message_not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("message '{}' does not exist", id))
    }
}

impl From<ValueObjectError> for ChatError {
    fn from(e: ValueObjectError) -> Self {
        Self::InvalidArgument(e.to_string())
    }
}

impl From<StoreError> for ChatError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(reason) => Self::StoreUnavailable(reason),
        }
    }
}
