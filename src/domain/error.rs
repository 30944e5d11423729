use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

use super::models::{ApprovalStatus, PostId};

/// Failures surfaced by the community engine. Every rejected operation leaves
/// the store untouched.
#[derive(Debug, Error)]
pub enum CommunityError {
    #[error("invalid username or password")]
    Authentication,

    #[error("not authorized to {0}")]
    Authorization(&'static str),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("post {post_id} is already {current}")]
    InvalidState {
        post_id: PostId,
        current: ApprovalStatus,
    },

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
}

impl CommunityError {
    pub fn not_found(entity: &'static str, id: impl Into<Uuid>) -> Self {
        CommunityError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

pub type CommunityResult<T> = Result<T, CommunityError>;
