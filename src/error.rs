use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::borrow::Cow;

use crate::domain::{models::ApprovalStatus, CommunityError};

pub enum AppError {
    InternalServerError(anyhow::Error),
    ResponseStatusError(StatusCode, Cow<'static, str>),
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldDetail {
    field: String,
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AppErrorResponse {
    status: u16,
    message: Cow<'static, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_status: Option<ApprovalStatus>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<FieldDetail>,
}

impl AppErrorResponse {
    fn new(code: StatusCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            status: code.as_u16(),
            message: message.into(),
            current_status: None,
            details: Vec::new(),
        }
    }

    fn into_response(self) -> Response {
        let code = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (code, Json(self)).into_response()
    }
}

fn community_error_response(err: &CommunityError) -> AppErrorResponse {
    match err {
        CommunityError::Authentication => {
            AppErrorResponse::new(StatusCode::UNAUTHORIZED, err.to_string())
        }
        CommunityError::Authorization(_) => {
            AppErrorResponse::new(StatusCode::FORBIDDEN, err.to_string())
        }
        CommunityError::NotFound { .. } => {
            AppErrorResponse::new(StatusCode::NOT_FOUND, err.to_string())
        }
        CommunityError::InvalidState { current, .. } => AppErrorResponse {
            current_status: Some(*current),
            ..AppErrorResponse::new(StatusCode::CONFLICT, err.to_string())
        },
        CommunityError::Validation(errors) => {
            let mut details: Vec<FieldDetail> = errors
                .field_errors()
                .iter()
                .flat_map(|(field, errors)| {
                    errors.iter().map(move |e| FieldDetail {
                        field: field.to_string(),
                        message: e
                            .message
                            .clone()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string()),
                    })
                })
                .collect();
            details.sort_by(|a, b| a.field.cmp(&b.field));
            AppErrorResponse {
                details,
                ..AppErrorResponse::new(StatusCode::UNPROCESSABLE_ENTITY, "validation failed")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::InternalServerError(err) => match err.downcast::<CommunityError>() {
                Ok(domain) => community_error_response(&domain).into_response(),
                Err(err) => {
                    tracing::error!(error = ?err, "request failed");
                    AppErrorResponse::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                        .into_response()
                }
            },
            AppError::ResponseStatusError(code, s) => AppErrorResponse::new(code, s).into_response(),
        }
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(e: E) -> AppError {
        AppError::InternalServerError(e.into())
    }
}

impl AppError {
    pub fn from(code: StatusCode, s: impl Into<Cow<'static, str>>) -> AppError {
        AppError::ResponseStatusError(code, s.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::PostId;
    use validator::{ValidationError, ValidationErrors};

    fn status_of(err: CommunityError) -> StatusCode {
        let err: AppError = err.into();
        err.into_response().status()
    }

    #[test]
    fn test_community_errors_map_to_status_codes() {
        assert_eq!(status_of(CommunityError::Authentication), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(CommunityError::Authorization("approve posts")),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(CommunityError::not_found("post", PostId::new())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(CommunityError::InvalidState {
                post_id: PostId::new(),
                current: ApprovalStatus::Approved,
            }),
            StatusCode::CONFLICT
        );

        let mut errors = ValidationErrors::new();
        errors.add("title", ValidationError::new("blank"));
        assert_eq!(
            status_of(CommunityError::Validation(errors)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_invalid_state_body_carries_current_status() {
        let body = community_error_response(&CommunityError::InvalidState {
            post_id: PostId::new(),
            current: ApprovalStatus::Rejected,
        });
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], 409);
        assert_eq!(json["currentStatus"], "rejected");
    }

    #[test]
    fn test_other_errors_are_internal() {
        let err: AppError = anyhow::anyhow!("disk on fire").into();
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let err = AppError::from(StatusCode::BAD_REQUEST, "bad date");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
