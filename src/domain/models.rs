//! Entities shared by the community engine.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

entity_id!(AdminId);
entity_id!(ClubId);
entity_id!(PostId);
entity_id!(EventId);
entity_id!(NotificationId);

/// Text with a base-language value and an optional Arabic rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Translated<T> {
    #[serde(default)]
    pub base: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arabic: Option<T>,
}

impl<T> Translated<T> {
    pub fn new(base: T, arabic: Option<T>) -> Self {
        Self { base, arabic }
    }

    pub fn base_only(base: T) -> Self {
        Self { base, arabic: None }
    }

    /// The Arabic rendering when present, otherwise the base value.
    pub fn arabic_or_base(&self) -> &T {
        self.arabic.as_ref().unwrap_or(&self.base)
    }
}

impl Translated<String> {
    /// Trims the base value and drops a blank Arabic rendering.
    pub fn normalized(self) -> Self {
        let arabic = self
            .arabic
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());
        Self {
            base: self.base.trim().to_string(),
            arabic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    AppAdmin,
    ClubAdmin,
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleKind::AppAdmin => write!(f, "app_admin"),
            RoleKind::ClubAdmin => write!(f, "club_admin"),
        }
    }
}

/// Authority held by an administrator. A club admin is bound to one club by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    AppAdmin,
    ClubAdmin { club_id: ClubId },
}

impl Role {
    pub fn kind(&self) -> RoleKind {
        match self {
            Role::AppAdmin => RoleKind::AppAdmin,
            Role::ClubAdmin { .. } => RoleKind::ClubAdmin,
        }
    }

    pub fn club_affiliation(&self) -> Option<ClubId> {
        match self {
            Role::AppAdmin => None,
            Role::ClubAdmin { club_id } => Some(*club_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Administrator {
    pub id: AdminId,
    pub username: String,
    /// Argon2 PHC string.
    pub credential: String,
    pub role: Role,
}

impl Administrator {
    pub fn new(username: impl Into<String>, credential_hash: impl Into<String>, role: Role) -> Self {
        Self {
            id: AdminId::new(),
            username: username.into(),
            credential: credential_hash.into(),
            role,
        }
    }

    pub fn is_app_admin(&self) -> bool {
        self.role == Role::AppAdmin
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Club {
    pub id: ClubId,
    pub name: Translated<String>,
    pub description: Translated<String>,
    pub logo_url: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub registration_link: Option<String>,
}

/// Replacement values for every mutable club field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClubUpdate {
    pub name: String,
    pub name_ar: Option<String>,
    pub description: String,
    pub description_ar: Option<String>,
    pub logo_url: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub registration_link: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalStatus::Pending => write!(f, "pending"),
            ApprovalStatus::Approved => write!(f, "approved"),
            ApprovalStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Moderation state of a post. A rejection always carries its reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "approvalStatus", rename_all = "snake_case")]
pub enum Moderation {
    Pending,
    Approved,
    Rejected {
        #[serde(rename = "rejectionReason")]
        reason: String,
    },
}

impl Moderation {
    pub fn status(&self) -> ApprovalStatus {
        match self {
            Moderation::Pending => ApprovalStatus::Pending,
            Moderation::Approved => ApprovalStatus::Approved,
            Moderation::Rejected { .. } => ApprovalStatus::Rejected,
        }
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        match self {
            Moderation::Rejected { reason } => Some(reason),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PostImage {
    Url(String),
    #[serde(serialize_with = "serialize_base64")]
    Bytes(Vec<u8>),
}

fn serialize_base64<T, S>(bytes: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: AsRef<[u8]>,
    S: serde::Serializer,
{
    use base64::Engine;
    serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes.as_ref()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub club_id: ClubId,
    pub title: Translated<String>,
    pub description: Translated<String>,
    pub content: Translated<String>,
    pub date: DateTime<Utc>,
    pub image: Option<PostImage>,
    #[serde(flatten)]
    pub moderation: Moderation,
}

impl Post {
    pub fn status(&self) -> ApprovalStatus {
        self.moderation.status()
    }

    pub fn is_approved(&self) -> bool {
        self.moderation == Moderation::Approved
    }
}

/// Input for a new post. `club_id` is optional so that a missing club
/// selection is reported as a validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub club_id: Option<ClubId>,
    pub title: Translated<String>,
    pub description: Translated<String>,
    pub content: Translated<String>,
    pub image: Option<PostImage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub club_id: ClubId,
    pub title: Translated<String>,
    pub description: Translated<String>,
    pub location: Translated<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_all_day: bool,
}

impl Event {
    /// Whether `date` falls within the event's calendar days, both ends inclusive.
    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        self.start_date.date_naive() <= date && date <= self.end_date.date_naive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub club_id: Option<ClubId>,
    pub title: Translated<String>,
    pub description: Translated<String>,
    pub location: Translated<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_all_day: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewEvent,
    UpcomingEvent,
    PostPendingApproval,
    PostApproved,
    PostRejected,
    NewPost,
}

impl NotificationKind {
    /// Public announcements, as opposed to moderation-internal kinds.
    pub fn is_public(&self) -> bool {
        matches!(
            self,
            NotificationKind::NewEvent | NotificationKind::UpcomingEvent | NotificationKind::NewPost
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum RelatedEntity {
    Post(PostId),
    Event(EventId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub title: Translated<String>,
    pub message: Translated<String>,
    pub date: DateTime<Utc>,
    pub is_read: bool,
    pub club_id: ClubId,
    pub related: Option<RelatedEntity>,
}

impl Notification {
    pub fn related_post(&self) -> Option<PostId> {
        match self.related {
            Some(RelatedEntity::Post(id)) => Some(id),
            _ => None,
        }
    }

    pub fn related_event(&self) -> Option<EventId> {
        match self.related {
            Some(RelatedEntity::Event(id)) => Some(id),
            _ => None,
        }
    }
}
