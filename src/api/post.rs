use crate::{
    auth::{ExtractAuth, OptionalAuth},
    domain::{
        models::{ApprovalStatus, ClubId, NewPost, Post, PostId, PostImage, Translated},
        validation, CommunityError,
    },
    error::{AppError, AppResult},
    AppState,
};
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use base64::Engine;
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostRequest {
    club_id: Option<ClubId>,
    #[serde(default)]
    title: String,
    title_ar: Option<String>,
    #[serde(default)]
    description: String,
    description_ar: Option<String>,
    #[serde(default)]
    content: String,
    content_ar: Option<String>,
    image_url: Option<String>,
    /// Base64-encoded image bytes.
    image_data: Option<String>,
}

fn image_error(message: &'static str) -> CommunityError {
    CommunityError::Validation(validation::single("image", "image", message))
}

impl TryFrom<PostRequest> for NewPost {
    type Error = CommunityError;

    fn try_from(req: PostRequest) -> Result<Self, Self::Error> {
        let image_url = validation::blank_to_none(req.image_url);
        let image_data = validation::blank_to_none(req.image_data);
        let image = match (image_url, image_data) {
            (Some(_), Some(_)) => {
                return Err(image_error("send either imageUrl or imageData, not both"))
            }
            (Some(url), None) => Some(PostImage::Url(url)),
            (None, Some(data)) => {
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(data)
                    .map_err(|_| image_error("imageData is not valid base64"))?;
                Some(PostImage::Bytes(bytes))
            }
            (None, None) => None,
        };

        Ok(NewPost {
            club_id: req.club_id,
            title: Translated::new(req.title, req.title_ar),
            description: Translated::new(req.description, req.description_ar),
            content: Translated::new(req.content, req.content_ar),
            image,
        })
    }
}

#[derive(Deserialize)]
struct RejectRequest {
    #[serde(default)]
    reason: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostQuery {
    club_id: Option<ClubId>,
    status: Option<ApprovalStatus>,
}

async fn create(
    Extension(state): Extension<AppState>,
    ExtractAuth(auth): ExtractAuth,
    Json(req): Json<PostRequest>,
) -> AppResult<(StatusCode, Json<Post>)> {
    let input = NewPost::try_from(req)?;
    let post = state.community.create_post(&auth.session, input).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

async fn approve(
    Extension(state): Extension<AppState>,
    Path(post_id): Path<PostId>,
    ExtractAuth(auth): ExtractAuth,
) -> AppResult<Json<Post>> {
    Ok(Json(
        state.community.approve_post(&auth.session, post_id).await?,
    ))
}

async fn reject(
    Extension(state): Extension<AppState>,
    Path(post_id): Path<PostId>,
    ExtractAuth(auth): ExtractAuth,
    Json(req): Json<RejectRequest>,
) -> AppResult<Json<Post>> {
    Ok(Json(
        state
            .community
            .reject_post(&auth.session, post_id, &req.reason)
            .await?,
    ))
}

async fn delete(
    Extension(state): Extension<AppState>,
    Path(post_id): Path<PostId>,
    ExtractAuth(auth): ExtractAuth,
) -> AppResult<StatusCode> {
    state.community.delete_post(&auth.session, post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// With `clubId`, the club's posts: every status for callers who manage the
/// club, approved only otherwise. Without it, the general feed.
async fn list(
    Extension(state): Extension<AppState>,
    Query(query): Query<PostQuery>,
    OptionalAuth(session): OptionalAuth,
) -> AppResult<Json<Vec<Post>>> {
    let posts = match query.club_id {
        Some(club_id) => {
            let club = state
                .community
                .get_club(club_id)
                .await
                .ok_or_else(|| AppError::from(StatusCode::NOT_FOUND, "the club does not exist"))?;
            let approved_only = !session.can_mutate(&club);
            state.community.posts_for_club(club_id, approved_only).await
        }
        None => state.community.visible_posts(&session).await,
    };

    Ok(Json(
        posts
            .into_iter()
            .filter(|p| query.status.map_or(true, |s| p.status() == s))
            .collect(),
    ))
}

async fn info(
    Extension(state): Extension<AppState>,
    Path(post_id): Path<PostId>,
    OptionalAuth(session): OptionalAuth,
) -> AppResult<Json<Post>> {
    Ok(Json(state.community.get_post(&session, post_id).await?))
}

pub fn app() -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:post_id", get(info).delete(delete))
        .route("/:post_id/approve", post(approve))
        .route("/:post_id/reject", post(reject))
}
