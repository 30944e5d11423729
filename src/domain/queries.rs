//! Role- and club-scoped read views.

use chrono::NaiveDate;
use itertools::Itertools;

use super::{
    error::{CommunityError, CommunityResult},
    identity::Session,
    lifecycle::Community,
    models::{ApprovalStatus, ClubId, Event, EventId, Post, PostId},
    store::Store,
};

fn newest_first(posts: impl Iterator<Item = Post>) -> Vec<Post> {
    posts.sorted_by(|a, b| b.date.cmp(&a.date)).collect()
}

impl<S: Store> Community<S> {
    /// Posts owned by `club_id`, optionally restricted to approved ones.
    pub async fn posts_for_club(&self, club_id: ClubId, approved_only: bool) -> Vec<Post> {
        let store = self.lock().await;
        newest_first(
            store
                .posts()
                .filter(|p| p.club_id == club_id)
                .filter(|p| !approved_only || p.is_approved())
                .cloned(),
        )
    }

    /// The general feed: approved posts for everyone plus the pending posts the
    /// session may moderate or manage. Rejected posts never appear here.
    pub async fn visible_posts(&self, session: &Session) -> Vec<Post> {
        let store = self.lock().await;
        newest_first(
            store
                .posts()
                .filter(|p| match p.status() {
                    ApprovalStatus::Approved => true,
                    ApprovalStatus::Pending => store
                        .club(p.club_id)
                        .map_or(false, |club| session.can_mutate(club)),
                    ApprovalStatus::Rejected => false,
                })
                .cloned(),
        )
    }

    /// Direct lookup. Unapproved posts outside the session's scope are
    /// reported as missing.
    pub async fn get_post(&self, session: &Session, post_id: PostId) -> CommunityResult<Post> {
        let store = self.lock().await;
        store
            .post(post_id)
            .filter(|p| {
                p.is_approved()
                    || store
                        .club(p.club_id)
                        .map_or(false, |club| session.can_mutate(club))
            })
            .cloned()
            .ok_or_else(|| CommunityError::not_found("post", post_id))
    }

    /// Events whose calendar days include `date`.
    pub async fn events_on_date(&self, date: NaiveDate) -> Vec<Event> {
        let store = self.lock().await;
        store
            .events()
            .filter(|e| e.occurs_on(date))
            .sorted_by_key(|e| e.start_date)
            .cloned()
            .collect()
    }

    pub async fn list_events(&self) -> Vec<Event> {
        let store = self.lock().await;
        store
            .events()
            .sorted_by(|a, b| b.start_date.cmp(&a.start_date))
            .cloned()
            .collect()
    }

    pub async fn get_event(&self, event_id: EventId) -> CommunityResult<Event> {
        let store = self.lock().await;
        store
            .event(event_id)
            .cloned()
            .ok_or_else(|| CommunityError::not_found("event", event_id))
    }
}
