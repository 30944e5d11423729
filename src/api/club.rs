use crate::{
    auth::ExtractAuth,
    domain::models::{Club, ClubId, ClubUpdate, Translated},
    error::{AppError, AppResult},
    AppState,
};
use axum::{extract::Path, http::StatusCode, routing::get, Extension, Json, Router};
use serde::Deserialize;

/// Same shape as a serialized [`Club`]; `id` and unknown fields are ignored.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClubRequest {
    #[serde(default)]
    name: Translated<String>,
    #[serde(default)]
    description: Translated<String>,
    logo_url: Option<String>,
    email: Option<String>,
    website: Option<String>,
    registration_link: Option<String>,
}

impl From<ClubRequest> for ClubUpdate {
    fn from(req: ClubRequest) -> Self {
        ClubUpdate {
            name: req.name.base,
            name_ar: req.name.arabic,
            description: req.description.base,
            description_ar: req.description.arabic,
            logo_url: req.logo_url,
            email: req.email,
            website: req.website,
            registration_link: req.registration_link,
        }
    }
}

async fn list(Extension(state): Extension<AppState>) -> Json<Vec<Club>> {
    Json(state.community.list_clubs().await)
}

async fn info(
    Extension(state): Extension<AppState>,
    Path(club_id): Path<ClubId>,
) -> AppResult<Json<Club>> {
    state
        .community
        .get_club(club_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::from(StatusCode::NOT_FOUND, "the club does not exist"))
}

async fn edit_club(
    Extension(state): Extension<AppState>,
    Path(club_id): Path<ClubId>,
    ExtractAuth(auth): ExtractAuth,
    Json(req): Json<ClubRequest>,
) -> AppResult<Json<Club>> {
    let club = state
        .community
        .update_club(&auth.session, club_id, req.into())
        .await?;
    Ok(Json(club))
}

pub fn app() -> Router {
    Router::new()
        .route("/", get(list))
        .route("/:club_id", get(info).patch(edit_club))
}
