//! Post moderation state machine and event publication.
//!
//! Posts move `Pending -> Approved` or `Pending -> Rejected`; both outcomes are
//! final. Events have no moderation and are visible as soon as they exist.
//! Every transition appends its notifications inside the same critical
//! section, so a failed operation never leaves a partial write behind.

use chrono::{Duration, NaiveTime, TimeZone, Utc};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};
use validator::ValidationErrors;

use super::{
    error::{CommunityError, CommunityResult},
    identity::{authorize_club_mutation, Session},
    models::{Event, EventId, Moderation, NewEvent, NewPost, Post, PostId},
    notifications::fan_out,
    store::{MemoryStore, Store},
    validation,
};

/// Reason recorded when a post is rejected without one.
pub const NO_REASON_PROVIDED: &str = "No reason provided";

/// The community engine. All operations on the underlying store are
/// serialized through one lock.
pub struct Community<S = MemoryStore> {
    store: Mutex<S>,
}

impl Default for Community<MemoryStore> {
    fn default() -> Self {
        Self::new(MemoryStore::new())
    }
}

impl<S: Store> Community<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    pub(super) async fn lock(&self) -> MutexGuard<'_, S> {
        self.store.lock().await
    }

    pub async fn create_post(&self, session: &Session, input: NewPost) -> CommunityResult<Post> {
        let admin = session.require_admin("create posts")?;
        let input = NewPost {
            title: input.title.normalized(),
            description: input.description.normalized(),
            content: input.content.normalized(),
            ..input
        };

        let mut store = self.lock().await;

        if let Some(club) = input.club_id.and_then(|id| store.club(id)) {
            if !authorize_club_mutation(admin, club) {
                warn!(admin = %admin.username, club_id = %club.id, "denied: post for a club outside scope");
                return Err(CommunityError::Authorization("create posts for this club"));
            }
        }

        let mut errors = ValidationErrors::new();
        validation::require_translated(&mut errors, "title", &input.title);
        validation::require_translated(&mut errors, "description", &input.description);
        validation::require_translated(&mut errors, "content", &input.content);
        validation::image(&mut errors, &input.image);
        let club_id = validation::finish_with_selection(errors, "club_id", input.club_id)?;
        let club = store
            .club(club_id)
            .cloned()
            .ok_or_else(|| CommunityError::not_found("club", club_id))?;

        let post = Post {
            id: PostId::new(),
            club_id,
            title: input.title,
            description: input.description,
            content: input.content,
            date: Utc::now(),
            image: input.image,
            moderation: Moderation::Pending,
        };

        store.insert_post(post.clone());
        store.append_notification(fan_out::post_pending_approval(&post, &club));

        info!(post_id = %post.id, club_id = %club.id, author = %admin.username, "post submitted for approval");
        Ok(post)
    }

    pub async fn approve_post(&self, session: &Session, post_id: PostId) -> CommunityResult<Post> {
        self.resolve_post(session, post_id, Moderation::Approved).await
    }

    /// Rejects a pending post. A blank `reason` is replaced by
    /// [`NO_REASON_PROVIDED`].
    pub async fn reject_post(
        &self,
        session: &Session,
        post_id: PostId,
        reason: &str,
    ) -> CommunityResult<Post> {
        let reason = validation::blank_to_none(Some(reason.to_string()))
            .unwrap_or_else(|| NO_REASON_PROVIDED.to_string());
        self.resolve_post(session, post_id, Moderation::Rejected { reason })
            .await
    }

    async fn resolve_post(
        &self,
        session: &Session,
        post_id: PostId,
        outcome: Moderation,
    ) -> CommunityResult<Post> {
        let action = match outcome {
            Moderation::Approved => "approve posts",
            _ => "reject posts",
        };
        let admin = session.require_admin(action)?;
        if !admin.is_app_admin() {
            warn!(admin = %admin.username, %post_id, "denied: only app admins moderate posts");
            return Err(CommunityError::Authorization(action));
        }

        let mut store = self.lock().await;

        let post = store
            .post(post_id)
            .ok_or_else(|| CommunityError::not_found("post", post_id))?;
        if post.moderation != Moderation::Pending {
            return Err(CommunityError::InvalidState {
                post_id,
                current: post.status(),
            });
        }
        let club = store
            .club(post.club_id)
            .cloned()
            .ok_or_else(|| CommunityError::not_found("club", post.club_id))?;

        let post = match store.post_mut(post_id) {
            Some(post) => {
                post.moderation = outcome;
                post.clone()
            }
            None => return Err(CommunityError::not_found("post", post_id)),
        };

        match &post.moderation {
            Moderation::Rejected { reason } => {
                store.append_notification(fan_out::post_rejected(&post, &club, reason));
            }
            _ => {
                store.append_notification(fan_out::post_approved(&post, &club));
                store.append_notification(fan_out::new_post(&post, &club));
            }
        }

        info!(%post_id, status = %post.status(), moderator = %admin.username, "post moderated");
        Ok(post)
    }

    /// Removes a post. Deleting a post that no longer exists succeeds.
    pub async fn delete_post(&self, session: &Session, post_id: PostId) -> CommunityResult<()> {
        let admin = session.require_admin("delete posts")?;
        let mut store = self.lock().await;

        let Some(post) = store.post(post_id) else {
            debug!(%post_id, "delete of absent post ignored");
            return Ok(());
        };

        let allowed = match store.club(post.club_id) {
            Some(club) => authorize_club_mutation(admin, club),
            None => admin.is_app_admin(),
        };
        if !allowed {
            warn!(admin = %admin.username, %post_id, "denied: delete outside scope");
            return Err(CommunityError::Authorization("delete posts of this club"));
        }

        store.remove_post(post_id);
        info!(%post_id, admin = %admin.username, "post deleted");
        Ok(())
    }

    pub async fn create_event(&self, session: &Session, input: NewEvent) -> CommunityResult<Event> {
        let admin = session.require_admin("create events")?;
        let input = NewEvent {
            title: input.title.normalized(),
            description: input.description.normalized(),
            location: input.location.normalized(),
            ..input
        };

        let mut store = self.lock().await;

        if let Some(club) = input.club_id.and_then(|id| store.club(id)) {
            if !authorize_club_mutation(admin, club) {
                warn!(admin = %admin.username, club_id = %club.id, "denied: event for a club outside scope");
                return Err(CommunityError::Authorization("create events for this club"));
            }
        }

        let mut errors = ValidationErrors::new();
        validation::require_translated(&mut errors, "title", &input.title);
        validation::require_translated(&mut errors, "description", &input.description);
        validation::require_translated(&mut errors, "location", &input.location);
        validation::date_order(&mut errors, input.end_date >= input.start_date);
        let club_id = validation::finish_with_selection(errors, "club_id", input.club_id)?;
        let club = store
            .club(club_id)
            .cloned()
            .ok_or_else(|| CommunityError::not_found("club", club_id))?;

        let (start_date, end_date) = if input.is_all_day {
            let start = Utc.from_utc_datetime(&input.start_date.date_naive().and_time(NaiveTime::MIN));
            let end = Utc.from_utc_datetime(&input.end_date.date_naive().and_time(NaiveTime::MIN))
                + Duration::days(1)
                - Duration::seconds(1);
            (start, end)
        } else {
            (input.start_date, input.end_date)
        };

        let event = Event {
            id: EventId::new(),
            club_id,
            title: input.title,
            description: input.description,
            location: input.location,
            start_date,
            end_date,
            is_all_day: input.is_all_day,
        };

        store.insert_event(event.clone());
        store.append_notification(fan_out::new_event(&event, &club));

        info!(event_id = %event.id, club_id = %club.id, author = %admin.username, "event published");
        Ok(event)
    }
}
