use std::{sync::Arc, time::Duration};

use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod seed;

use auth::{Keys, Revocations};
use domain::{AdminRegistry, Community};

/// Shared by every handler through an `Extension` layer.
#[derive(Clone)]
pub struct AppState {
    pub community: Arc<Community>,
    pub registry: Arc<dyn AdminRegistry>,
    pub keys: Arc<Keys>,
    pub revocations: Revocations,
    pub token_ttl: Duration,
}

impl AppState {
    pub fn new(
        community: Community,
        registry: impl AdminRegistry + 'static,
        keys: Keys,
        token_ttl: Duration,
    ) -> Self {
        Self {
            community: Arc::new(community),
            registry: Arc::new(registry),
            keys: Arc::new(keys),
            revocations: Revocations::default(),
            token_ttl,
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", api::app())
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
}
