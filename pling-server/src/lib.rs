pub mod api;
pub mod auth;
pub mod dispatch;
pub mod error;
pub mod read_state;
pub mod registry;
pub mod store;
pub mod ws;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};

use auth::{AdminPolicy, Verifier};
use registry::ConnectionRegistry;
use store::NotificationStore;

/// Everything the handlers share: the notification store, the live
/// connection registry, and the auth collaborators. Cheap to clone; the
/// store and registry sit behind their own locks since HTTP and WebSocket
/// handlers mutate them concurrently.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<NotificationStore>>,
    pub registry: Arc<RwLock<ConnectionRegistry>>,
    pub identity: Arc<Verifier>,
    pub admins: Arc<AdminPolicy>,
    /// Require a valid bearer token for `GET /notifications`.
    pub protect_history: bool,
}

impl AppState {
    pub fn new(identity: Verifier, admins: AdminPolicy, protect_history: bool) -> Self {
        Self {
            store: Arc::new(RwLock::new(NotificationStore::new())),
            registry: Arc::new(RwLock::new(ConnectionRegistry::new())),
            identity: Arc::new(identity),
            admins: Arc::new(admins),
            protect_history,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/notifications", get(api::history).post(api::notify))
        .route("/ws", get(ws::handle_client_ws))
        .layer(cors)
        .with_state(state)
}
