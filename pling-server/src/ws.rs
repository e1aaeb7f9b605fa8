use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use pling_common::{ClientEvent, ServerEvent};

use crate::read_state;
use crate::registry::ConnectionHandle;
use crate::AppState;

/// Per-connection protocol state. A connection is anonymous until it sends
/// a `register` event; only registered connections may mark notifications
/// read. Disconnection is handled outside the machine by the socket tasks.
#[derive(Debug, Clone, PartialEq)]
pub enum Session {
    Anonymous,
    Registered { identity: String },
}

pub async fn handle_client_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(|socket| handle_client_socket(socket, state))
}

async fn handle_client_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (event_tx, mut event_rx) = mpsc::channel::<ServerEvent>(100);
    let handle = ConnectionHandle::new(event_tx);

    println!("client {} connected", handle.id());

    // Task: forward queued server events to the socket
    let send_task = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(j) => j,
                Err(_) => continue,
            };
            if sender.send(WsMessage::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // Task: drive the session state machine from incoming events
    let recv_state = state.clone();
    let recv_handle = handle.clone();
    let recv_task = tokio::spawn(async move {
        let mut session = Session::Anonymous;
        while let Some(Ok(msg)) = receiver.next().await {
            if let WsMessage::Text(text) = msg {
                if let Ok(event) = serde_json::from_str::<ClientEvent>(&text) {
                    session = handle_event(&recv_state, &recv_handle, session, event).await;
                }
            }
        }

        // Cleanup on disconnect. A no-op for connections that never
        // registered, and must not touch entries a newer connection has
        // since claimed.
        let removed = recv_state
            .registry
            .write()
            .await
            .unregister_by_handle(&recv_handle);
        match removed.as_slice() {
            [] => println!("client {} disconnected", recv_handle.id()),
            identities => println!(
                "client {} disconnected, unregistered {}",
                recv_handle.id(),
                identities.join(", ")
            ),
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = send_task => {}
        _ = recv_task => {}
    }
}

/// Apply one client event to the session, returning the next state.
///
/// `register` is accepted from either state; re-registering repeats the
/// registry insert and the initial-state replay. `mark_as_read` is only
/// honored once registered.
pub async fn handle_event(
    state: &AppState,
    handle: &ConnectionHandle,
    session: Session,
    event: ClientEvent,
) -> Session {
    match event {
        ClientEvent::Register { identity } => {
            state
                .registry
                .write()
                .await
                .register(identity.clone(), handle.clone());
            println!("client {} registered as {}", handle.id(), identity);

            // Initial state replay to this handle only. Snapshot under the
            // lock, send after releasing it.
            let (history, unread) = {
                let store = state.store.read().await;
                (store.list_all().to_vec(), store.unread_count())
            };
            let _ = handle
                .send(ServerEvent::History {
                    notifications: history,
                })
                .await;
            let _ = handle.send(ServerEvent::UnreadCount { count: unread }).await;

            Session::Registered { identity }
        }
        ClientEvent::MarkAsRead { notification_id } => match session {
            Session::Registered { .. } => {
                read_state::mark_as_read(state, handle, notification_id).await;
                session
            }
            Session::Anonymous => {
                println!(
                    "ignoring mark_as_read from unregistered client {}",
                    handle.id()
                );
                Session::Anonymous
            }
        },
    }
}
