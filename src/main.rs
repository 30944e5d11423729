use anyhow::Context;
use axum::http::Method;
use chrono::Utc;
use club_community::{
    app,
    auth::Keys,
    config::Config,
    domain::Community,
    logging,
    seed::{self, Seed},
    AppState,
};
use envconfig::Envconfig;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Periodically announces events that are about to start.
fn spawn_upcoming_sweep(
    community: Arc<Community>,
    window: chrono::Duration,
    every: std::time::Duration,
) {
    let mut interval = tokio::time::interval(every);
    tokio::spawn(async move {
        loop {
            interval.tick().await;
            let announced = community.announce_upcoming_events(Utc::now(), window).await;
            if announced > 0 {
                info!(announced, "upcoming events announced");
            }
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::init_from_env().context("invalid configuration")?;
    logging::init_logging(&config.log_level, &config.log_format);

    let keys = match &config.jwt_secret {
        Some(secret) => Keys::from_base64_secret(secret).context("JWT_SECRET is not valid base64")?,
        None => {
            warn!("JWT_SECRET is not set; tokens will not survive a restart");
            Keys::random()
        }
    };

    let community = Community::default();
    let seed = match &config.seed_path {
        Some(path) => Seed::from_file(path)?,
        None => {
            warn!("SEED_PATH is not set; starting without clubs or administrators");
            Seed::default()
        }
    };
    let registry = seed::load(&community, seed).await?;

    let token_ttl = config.token_ttl()?;
    let window = config.upcoming_window()?;
    let state = AppState::new(community, registry, keys, token_ttl);
    spawn_upcoming_sweep(
        state.community.clone(),
        window,
        config.upcoming_sweep_interval(),
    );

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
        .allow_origin(Any);
    let app = app(state).layer(cors);

    info!(port = config.port, "listening");
    axum::Server::bind(&([0, 0, 0, 0], config.port).into())
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
