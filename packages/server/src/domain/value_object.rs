//! Value Object 定義
//!
//! 文字列 ID や本文などのプリミティブをそのまま扱わず、生成時に検証済みの型として扱います。

use std::fmt;

use uuid::Uuid;

use super::error::ValueObjectError;

/// ID の最大長（文字数）
pub const MAX_ID_LEN: usize = 128;

/// メッセージ本文の最大長（文字数）
pub const MAX_MESSAGE_BODY_LEN: usize = 4000;

/// ルーム履歴取得の上限件数
pub const HISTORY_PAGE_SIZE: usize = 100;

/// 一時メッセージ ID のプレフィックス
pub const TEMP_ID_PREFIX: &str = "temp-";

fn validate_id(kind: &'static str, value: &str) -> Result<(), ValueObjectError> {
    if value.trim().is_empty() {
        return Err(ValueObjectError::EmptyId(kind));
    }
    if value.chars().count() > MAX_ID_LEN {
        return Err(ValueObjectError::IdTooLong {
            kind,
            max: MAX_ID_LEN,
        });
    }
    Ok(())
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            /// 検証付きで生成
            pub fn new(value: String) -> Result<Self, ValueObjectError> {
                validate_id($kind, &value)?;
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// ルーム ID
    RoomId,
    "room_id"
);

string_id!(
    /// ユーザー ID（Identity Provider が払い出す安定した識別子）
    UserId,
    "user_id"
);

string_id!(
    /// WebSocket コネクション ID
    ///
    /// 同じユーザーでも接続ごとに異なる ID を持つ。
    ConnectionId,
    "connection_id"
);

impl ConnectionId {
    /// 新しいコネクション ID を払い出す
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

/// 永続化済みメッセージの ID
///
/// MessageStore が払い出す。一時 ID（`temp-` プレフィックス）とは区別される。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        validate_id("message_id", &value)?;
        if value.starts_with(TEMP_ID_PREFIX) {
            return Err(ValueObjectError::TemporaryMessageId);
        }
        Ok(Self(value))
    }

    /// MessageStore 用の ID 払い出し
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ローカルエコー用の一時メッセージ ID
///
/// 送信者にのみ見える。必ず `temp-` で始まる。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TempMessageId(String);

impl TempMessageId {
    /// 送信ごとに新しい一時 ID を払い出す
    pub fn generate() -> Self {
        Self(format!("{}{}", TEMP_ID_PREFIX, Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TempMessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// メッセージ本文
///
/// 空白のみの本文は作れない。本文はインデントや改行を含めて入力どおりに保持する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBody(String);

impl MessageBody {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::EmptyMessageBody);
        }
        if value.chars().count() > MAX_MESSAGE_BODY_LEN {
            return Err(ValueObjectError::MessageBodyTooLong {
                max: MAX_MESSAGE_BODY_LEN,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageBody {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unix タイムスタンプ（ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
