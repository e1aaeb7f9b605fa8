use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use pling_common::{Notification, NotifyRequest, NotifyResponse};

use crate::auth::{bearer_token, VerifiedUser};
use crate::dispatch::{self, Delivery};
use crate::error::ApiError;
use crate::store::NotificationStore;
use crate::AppState;

/// POST /notifications - validate, authenticate, authorize, then append
/// and fan out. Nothing is written until every check has passed.
pub async fn notify(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<NotifyRequest>,
) -> Result<Json<NotifyResponse>, ApiError> {
    let title = req.title.as_deref().unwrap_or("");
    let message = req.message.as_deref().unwrap_or("");
    NotificationStore::validate(title, message)?;

    let user = authenticate(&state, &headers).await?;
    if !state.admins.is_authorized(&user) {
        println!("rejected notify from {}: not an admin", user.id);
        return Err(ApiError::Forbidden);
    }

    let notification = state.store.write().await.append(title, message)?;

    let delivery =
        dispatch::dispatch(&state.registry, &notification, req.target_user.as_deref()).await;

    match delivery {
        Delivery::Targeted(identity) => {
            println!(
                "notification {} \"{}\" sent to {}",
                notification.id, notification.title, identity
            );
        }
        Delivery::Broadcast(count) => {
            println!(
                "notification {} \"{}\" broadcast to {} client(s)",
                notification.id, notification.title, count
            );
        }
    }

    Ok(Json(NotifyResponse {
        success: true,
        notification,
    }))
}

/// GET /notifications - the full ordered history. Open by default; when
/// history protection is on, the same bearer verification as posting
/// applies (though any verified user may read, admin or not).
pub async fn history(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Notification>>, ApiError> {
    if state.protect_history {
        authenticate(&state, &headers).await?;
    }
    Ok(Json(state.store.read().await.list_all().to_vec()))
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<VerifiedUser, ApiError> {
    let token = bearer_token(headers).ok_or(ApiError::Unauthorized)?;
    Ok(state.identity.verify(token).await?)
}
