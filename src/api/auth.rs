use crate::{
    auth::{self, ExtractAuth},
    domain::{
        models::{AdminId, Administrator, ClubId, RoleKind},
        Session,
    },
    error::AppResult,
    AppState,
};
use axum::{
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
struct LoginRequest {
    username: String,
    credential: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AdminResponse {
    admin_id: AdminId,
    username: String,
    role: RoleKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    club_affiliation: Option<ClubId>,
}

impl From<&Administrator> for AdminResponse {
    fn from(admin: &Administrator) -> Self {
        Self {
            admin_id: admin.id,
            username: admin.username.clone(),
            role: admin.role.kind(),
            club_affiliation: admin.role.club_affiliation(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    token: String,
    expires_at: u64,
    #[serde(flatten)]
    admin: AdminResponse,
}

async fn login(
    Extension(state): Extension<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let mut session = Session::anonymous();
    let admin = session.login(state.registry.as_ref(), &req.username, &req.credential)?;
    let (token, claims) = auth::generate_jwt(&state.keys, admin.id, state.token_ttl)?;

    Ok(Json(LoginResponse {
        token,
        expires_at: claims.exp,
        admin: admin.into(),
    }))
}

async fn logout(
    Extension(state): Extension<AppState>,
    ExtractAuth(current): ExtractAuth,
) -> StatusCode {
    state
        .revocations
        .revoke(current.token_id, current.expires_at)
        .await;
    let mut session = current.session;
    session.logout();
    StatusCode::NO_CONTENT
}

async fn me(ExtractAuth(current): ExtractAuth) -> AppResult<Json<AdminResponse>> {
    let admin = current
        .session
        .admin()
        .ok_or_else(|| anyhow::anyhow!("authenticated session without an administrator"))?;
    Ok(Json(admin.into()))
}

pub fn app() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}
