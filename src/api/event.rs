use crate::{
    auth::ExtractAuth,
    domain::{
        models::{ClubId, Event, EventId, NewEvent, Translated},
        validation, CommunityError,
    },
    error::AppResult,
    AppState,
};
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventRequest {
    club_id: Option<ClubId>,
    #[serde(default)]
    title: String,
    title_ar: Option<String>,
    #[serde(default)]
    description: String,
    description_ar: Option<String>,
    #[serde(default)]
    location: String,
    location_ar: Option<String>,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    is_all_day: bool,
}

impl TryFrom<EventRequest> for NewEvent {
    type Error = CommunityError;

    fn try_from(req: EventRequest) -> Result<Self, Self::Error> {
        let (Some(start_date), Some(end_date)) = (req.start_date, req.end_date) else {
            let field = if req.start_date.is_none() { "start_date" } else { "end_date" };
            return Err(CommunityError::Validation(validation::single(
                field,
                "required",
                "a date must be given",
            )));
        };

        Ok(NewEvent {
            club_id: req.club_id,
            title: Translated::new(req.title, req.title_ar),
            description: Translated::new(req.description, req.description_ar),
            location: Translated::new(req.location, req.location_ar),
            start_date,
            end_date,
            is_all_day: req.is_all_day,
        })
    }
}

#[derive(Deserialize)]
struct EventQuery {
    /// `YYYY-MM-DD`, a UTC calendar day.
    date: Option<NaiveDate>,
}

async fn create(
    Extension(state): Extension<AppState>,
    ExtractAuth(auth): ExtractAuth,
    Json(req): Json<EventRequest>,
) -> AppResult<(StatusCode, Json<Event>)> {
    let input = NewEvent::try_from(req)?;
    let event = state.community.create_event(&auth.session, input).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

async fn list(
    Extension(state): Extension<AppState>,
    Query(query): Query<EventQuery>,
) -> Json<Vec<Event>> {
    Json(match query.date {
        Some(date) => state.community.events_on_date(date).await,
        None => state.community.list_events().await,
    })
}

async fn info(
    Extension(state): Extension<AppState>,
    Path(event_id): Path<EventId>,
) -> AppResult<Json<Event>> {
    Ok(Json(state.community.get_event(event_id).await?))
}

pub fn app() -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:event_id", get(info))
}
