//! ドメイン層のエラー定義

use thiserror::Error;

/// Value Object の生成時に発生するエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    /// ID が空
    #[error("{0} must not be empty")]
    EmptyId(&'static str),

    /// ID が長すぎる
    #[error("{kind} must be at most {max} characters")]
    IdTooLong { kind: &'static str, max: usize },

    /// 永続化済みメッセージの ID に一時 ID のプレフィックスが使われている
    #[error("message id must not start with the temporary prefix")]
    TemporaryMessageId,

    /// メッセージ本文が空（空白のみを含む）
    #[error("message body must not be empty")]
    EmptyMessageBody,

    /// メッセージ本文が長すぎる
    #[error("message body must be at most {max} characters")]
    MessageBodyTooLong { max: usize },
}

/// MessageStore のエラー
///
/// 永続化層の失敗はすべて `Unavailable` として呼び出し元に返す。リトライは行わない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("message store unavailable: {0}")]
    Unavailable(String),
}

/// MessagePusher のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    /// 送信先のコネクションが登録されていない
    #[error("Connection '{0}' not found")]
    ClientNotFound(String),

    /// 送信に失敗（受信側がすでに閉じている）
    #[error("Failed to push message: {0}")]
    PushFailed(String),
}
