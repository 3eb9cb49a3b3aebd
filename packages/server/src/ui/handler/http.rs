//! HTTP API endpoint handlers.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json,
    extract::{ConnectInfo, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    domain::{RoomId, ValueObjectError},
    infrastructure::dto::http::{
        ErrorDto, MessageDetailDto, RoomClearedDto, RoomHistoryDto, RoomPresenceDto,
    },
    ui::state::AppState,
    usecase::ChatError,
};

/// Error response body with a status derived from the error kind
#[derive(Debug)]
pub struct ApiError(ChatError);

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            ChatError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ChatError::NotFound(_) => StatusCode::NOT_FOUND,
            ChatError::Unauthorized(_) => StatusCode::FORBIDDEN,
            ChatError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(e: ChatError) -> Self {
        Self(e)
    }
}

impl From<ValueObjectError> for ApiError {
    fn from(e: ValueObjectError) -> Self {
        Self(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorDto {
            code: self.0.code().to_string(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get the most recent messages of a room (oldest first)
pub async fn get_room_messages(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<RoomHistoryDto>, ApiError> {
    let room_id = RoomId::new(room_id)?;
    let messages = state
        .get_room_history_usecase
        .execute(&room_id, query.limit)
        .await?;

    // Domain Model から DTO への変換
    Ok(Json(RoomHistoryDto {
        room_id: room_id.into_string(),
        messages: messages.into_iter().map(MessageDetailDto::from).collect(),
    }))
}

/// Get the connection count and members of a room
pub async fn get_room_presence(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomPresenceDto>, ApiError> {
    let room_id = RoomId::new(room_id)?;
    let presence = state.get_room_presence_usecase.execute(room_id).await;

    Ok(Json(RoomPresenceDto {
        room_id: presence.room_id.into_string(),
        count: presence.count,
        members: presence
            .members
            .into_iter()
            .map(|id| id.into_string())
            .collect(),
    }))
}

/// Delete every message of a room (moderators only)
pub async fn clear_room_messages(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomClearedDto>, ApiError> {
    let room_id = RoomId::new(room_id)?;
    let privileged = state.privilege_oracle.is_privileged(addr.ip());
    let deleted_count = state
        .clear_room_usecase
        .execute(&room_id, privileged)
        .await?;

    Ok(Json(RoomClearedDto {
        room_id: room_id.into_string(),
        deleted_count,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        // テスト項目: エラーの種類ごとに HTTP ステータスが決まる
        // given (前提条件):
        let cases = [
            (ChatError::InvalidArgument("x".into()), StatusCode::BAD_REQUEST),
            (ChatError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ChatError::Unauthorized("x".into()), StatusCode::FORBIDDEN),
            (
                ChatError::StoreUnavailable("x".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (error, expected) in cases {
            // when (操作):
            let response = ApiError::from(error).into_response();

            // then (期待する結果):
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_invalid_room_id_is_bad_request() {
        // テスト項目: 不正なルーム ID は 400
        // given (前提条件):
        let error = RoomId::new(" ".to_string()).unwrap_err();

        // when (操作):
        let response = ApiError::from(error).into_response();

        // then (期待する結果):
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
