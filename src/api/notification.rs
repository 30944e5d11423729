use crate::{
    auth::{ExtractAuth, OptionalAuth},
    domain::{
        models::{Notification, NotificationId},
        NotificationCategory,
    },
    error::AppResult,
    AppState,
};
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
struct NotificationQuery {
    category: Option<NotificationCategory>,
}

#[derive(Serialize)]
struct CountResponse {
    count: usize,
}

#[derive(Serialize)]
struct MarkedResponse {
    marked: usize,
}

async fn list(
    Extension(state): Extension<AppState>,
    Query(query): Query<NotificationQuery>,
    OptionalAuth(session): OptionalAuth,
) -> Json<Vec<Notification>> {
    Json(state.community.visible_to(&session, query.category).await)
}

async fn unread_count(
    Extension(state): Extension<AppState>,
    OptionalAuth(session): OptionalAuth,
) -> Json<CountResponse> {
    Json(CountResponse {
        count: state.community.unread_count(&session).await,
    })
}

async fn mark_read(
    Extension(state): Extension<AppState>,
    Path(id): Path<NotificationId>,
    OptionalAuth(session): OptionalAuth,
) -> AppResult<StatusCode> {
    state.community.mark_read(&session, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn mark_all_read(
    Extension(state): Extension<AppState>,
    ExtractAuth(_auth): ExtractAuth,
) -> Json<MarkedResponse> {
    Json(MarkedResponse {
        marked: state.community.mark_all_read().await,
    })
}

pub fn app() -> Router {
    Router::new()
        .route("/", get(list))
        .route("/unread-count", get(unread_count))
        .route("/read-all", post(mark_all_read))
        .route("/:notification_id/read", post(mark_read))
}
