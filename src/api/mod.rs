use axum::Router;

pub mod auth;
pub mod club;
pub mod event;
pub mod notification;
pub mod post;

pub fn app() -> Router {
    Router::new()
        .merge(auth::app())
        .nest("/clubs", club::app())
        .nest("/posts", post::app())
        .nest("/events", event::app())
        .nest("/notifications", notification::app())
}
