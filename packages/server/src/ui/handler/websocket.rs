//! WebSocket connection handlers.

use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use axum::{
    extract::{
        ConnectInfo, Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    domain::{
        ConnectionId, MessageId, PusherChannel, RoomId, UserId, UserProfile, ValueObjectError,
    },
    infrastructure::dto::websocket::{ClientEvent, ServerEvent},
    ui::state::AppState,
    usecase::ChatError,
};

/// Query parameters for WebSocket connection
///
/// The identity is supplied by the session bootstrap and trusted as given.
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub user_id: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub accent_color: Option<String>,
}

impl ConnectQuery {
    fn into_profile(self) -> Result<UserProfile, ValueObjectError> {
        let user_id = UserId::new(self.user_id)?;
        let display_name = self
            .display_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| user_id.as_str().to_string());

        Ok(UserProfile {
            user_id,
            display_name,
            avatar_url: self.avatar_url.filter(|url| !url.is_empty()),
            accent_color: self.accent_color.filter(|color| !color.is_empty()),
        })
    }
}

/// Per-connection context shared by the reader loop
struct Session {
    connection_id: ConnectionId,
    profile: UserProfile,
    /// Caller's network origin, handed to the privilege oracle on every mutating call
    origin: IpAddr,
    /// Same channel the MessagePusher writes to, used for caller-only error reports
    outbound: PusherChannel,
}

impl Session {
    fn report(&self, error: &ChatError) {
        let event = ServerEvent::Error {
            code: error.code().to_string(),
            message: error.to_string(),
        };
        match serde_json::to_string(&event) {
            Ok(json) => {
                if self.outbound.send(json).is_err() {
                    tracing::debug!(
                        "Connection '{}' closed before error could be reported",
                        self.connection_id
                    );
                }
            }
            Err(e) => tracing::error!("Failed to serialize error event: {}", e),
        }
    }
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let profile = match query.into_profile() {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!("Rejected WebSocket handshake from {}: {}", addr, e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, profile, addr.ip())))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// This function handles the outbound message flow: events addressed to this connection
/// (via rx channel) are sent to its WebSocket.
///
/// # Arguments
///
/// * `rx` - Channel receiver for serialized events
/// * `sender` - WebSocket sink to send messages to this client
///
/// # Returns
///
/// A `JoinHandle` for the spawned task
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    profile: UserProfile,
    origin: IpAddr,
) {
    let (sender, mut receiver) = socket.split();

    // Create a channel for this connection to receive events
    let (tx, rx) = mpsc::unbounded_channel();
    let connection_id = ConnectionId::generate();
    state
        .connect_client_usecase
        .execute(connection_id.clone(), tx.clone())
        .await;
    tracing::info!(
        "User '{}' connected as '{}' from {}",
        profile.user_id,
        connection_id,
        origin
    );

    let session = Session {
        connection_id: connection_id.clone(),
        profile,
        origin,
        outbound: tx,
    };
    let state_clone = state.clone();

    // Spawn a task to receive events from this client
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    if let Err(e) = dispatch(&state_clone, &session, text.as_str()).await {
                        tracing::warn!(
                            "Request from connection '{}' failed: {}",
                            session.connection_id,
                            e
                        );
                        session.report(&e);
                    }
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!(
                        "Connection '{}' requested close",
                        session.connection_id
                    );
                    break;
                }
                _ => {}
            }
        }
    });

    // Spawn a task to send events to this client
    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    match state
        .disconnect_client_usecase
        .execute(&connection_id)
        .await
    {
        Some((room_id, count)) => tracing::info!(
            "Connection '{}' disconnected from room '{}' ({} remaining)",
            connection_id,
            room_id,
            count
        ),
        None => tracing::info!("Connection '{}' disconnected", connection_id),
    }
}

/// Route one inbound frame to its use case
///
/// Errors are returned to the reader loop, which reports them to this connection only.
async fn dispatch(state: &AppState, session: &Session, text: &str) -> Result<(), ChatError> {
    let event = serde_json::from_str::<ClientEvent>(text)
        .map_err(|e| ChatError::InvalidArgument(format!("malformed event: {}", e)))?;
    let connection_id = &session.connection_id;
    let profile = &session.profile;

    match event {
        ClientEvent::JoinRoom { room_id } => {
            let room_id = RoomId::new(room_id)?;
            state
                .join_room_usecase
                .execute(connection_id, room_id, profile)
                .await?;
        }
        ClientEvent::SendMessage { room_id, body } => {
            let room_id = RoomId::new(room_id)?;
            // 永続化の結果は SendMessageUseCase が送信者に通知する
            let pending = state
                .send_message_usecase
                .execute(connection_id.clone(), room_id, profile.clone(), body)
                .await?;
            tracing::debug!(
                "Message '{}' from '{}' is pending",
                pending.echo.temp_id,
                profile.user_id
            );
        }
        ClientEvent::MarkSeen { message_id } => {
            let message_id = MessageId::new(message_id)?;
            state
                .mark_seen_usecase
                .execute(&message_id, profile)
                .await?;
        }
        ClientEvent::EditMessage {
            message_id,
            new_body,
        } => {
            let message_id = MessageId::new(message_id)?;
            state
                .edit_message_usecase
                .execute(&message_id, &profile.user_id, new_body)
                .await?;
        }
        ClientEvent::DeleteMessage { message_id } => {
            let message_id = MessageId::new(message_id)?;
            let privileged = state.privilege_oracle.is_privileged(session.origin);
            state
                .delete_message_usecase
                .execute(&message_id, &profile.user_id, privileged)
                .await?;
        }
        ClientEvent::ClearRoom { room_id } => {
            let room_id = RoomId::new(room_id)?;
            let privileged = state.privilege_oracle.is_privileged(session.origin);
            state
                .clear_room_usecase
                .execute(&room_id, privileged)
                .await?;
        }
        ClientEvent::TypingStart { room_id } => {
            let room_id = RoomId::new(room_id)?;
            state
                .typing_relay_usecase
                .start(&room_id, connection_id, profile)
                .await;
        }
        ClientEvent::TypingStop { room_id } => {
            let room_id = RoomId::new(room_id)?;
            state
                .typing_relay_usecase
                .stop(&room_id, connection_id, profile)
                .await;
        }
    }

    Ok(())
}
