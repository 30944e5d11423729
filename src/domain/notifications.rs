//! Notification fan-out and per-role visibility.

use std::{collections::HashSet, str::FromStr};

use chrono::{DateTime, Duration, Utc};
use itertools::Itertools;
use serde::Deserialize;
use tracing::{debug, info};

use super::{
    error::{CommunityError, CommunityResult},
    identity::Session,
    lifecycle::Community,
    models::{Notification, NotificationId, NotificationKind, Role},
    store::Store,
};

/// Grouping offered by the notification screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    Events,
    Approvals,
    Approved,
    Rejected,
}

impl NotificationCategory {
    pub fn includes(&self, kind: NotificationKind) -> bool {
        match self {
            NotificationCategory::Events => matches!(
                kind,
                NotificationKind::NewEvent | NotificationKind::UpcomingEvent
            ),
            NotificationCategory::Approvals => kind == NotificationKind::PostPendingApproval,
            NotificationCategory::Approved => kind == NotificationKind::PostApproved,
            NotificationCategory::Rejected => kind == NotificationKind::PostRejected,
        }
    }
}

impl FromStr for NotificationCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "events" => Ok(NotificationCategory::Events),
            "approvals" => Ok(NotificationCategory::Approvals),
            "approved" => Ok(NotificationCategory::Approved),
            "rejected" => Ok(NotificationCategory::Rejected),
            _ => Err(format!("Unknown notification category: {}", s)),
        }
    }
}

/// Whether `notification` belongs in the feed of `session`.
pub fn is_visible(session: &Session, notification: &Notification) -> bool {
    match session.admin().map(|a| a.role) {
        None => notification.kind.is_public(),
        Some(Role::AppAdmin) => true,
        Some(Role::ClubAdmin { club_id }) => {
            notification.kind.is_public() || notification.club_id == club_id
        }
    }
}

impl<S: Store> Community<S> {
    /// Notifications the session may see, newest first. Evaluated on every call.
    pub async fn visible_to(
        &self,
        session: &Session,
        category: Option<NotificationCategory>,
    ) -> Vec<Notification> {
        let store = self.lock().await;
        store
            .notifications()
            .filter(|n| is_visible(session, n))
            .filter(|n| category.map_or(true, |c| c.includes(n.kind)))
            .sorted_by(|a, b| b.date.cmp(&a.date))
            .cloned()
            .collect()
    }

    pub async fn unread_count(&self, session: &Session) -> usize {
        let store = self.lock().await;
        store
            .notifications()
            .filter(|n| !n.is_read && is_visible(session, n))
            .count()
    }

    /// Marks one notification read. Repeating the call is harmless; ids the
    /// session cannot see are reported as missing.
    pub async fn mark_read(&self, session: &Session, id: NotificationId) -> CommunityResult<()> {
        let mut store = self.lock().await;
        match store.notification_mut(id) {
            Some(n) if is_visible(session, n) => {
                n.is_read = true;
                Ok(())
            }
            _ => Err(CommunityError::not_found("notification", id)),
        }
    }

    /// Marks every stored notification read and returns how many changed.
    pub async fn mark_all_read(&self) -> usize {
        let marked = self.lock().await.mark_all_notifications_read();
        debug!(marked, "notifications marked read");
        marked
    }

    /// Announces events starting within `window` of `now`. Each event is
    /// announced at most once.
    pub async fn announce_upcoming_events(&self, now: DateTime<Utc>, window: Duration) -> usize {
        let mut store = self.lock().await;

        let announced: HashSet<_> = store
            .notifications()
            .filter(|n| n.kind == NotificationKind::UpcomingEvent)
            .filter_map(|n| n.related_event())
            .collect();

        let due: Vec<_> = store
            .events()
            .filter(|e| !announced.contains(&e.id))
            .filter(|e| {
                e.start_date >= now
                    && now
                        .checked_add_signed(window)
                        .map_or(true, |horizon| e.start_date <= horizon)
            })
            .filter_map(|e| {
                store
                    .club(e.club_id)
                    .map(|club| fan_out::upcoming_event(e, club))
            })
            .collect();

        let count = due.len();
        for notification in due {
            info!(event_id = ?notification.related_event(), "upcoming event announced");
            store.append_notification(notification);
        }
        count
    }
}

/// Builders for the notifications each lifecycle transition emits.
pub(crate) mod fan_out {
    use chrono::Utc;

    use crate::domain::models::{
        Club, Event, Notification, NotificationId, NotificationKind, Post, RelatedEntity,
        Translated,
    };

    fn notification(
        kind: NotificationKind,
        club: &Club,
        related: RelatedEntity,
        title: (&str, &str),
        message: (String, String),
    ) -> Notification {
        Notification {
            id: NotificationId::new(),
            kind,
            title: Translated::new(title.0.to_string(), Some(title.1.to_string())),
            message: Translated::new(message.0, Some(message.1)),
            date: Utc::now(),
            is_read: false,
            club_id: club.id,
            related: Some(related),
        }
    }

    pub(crate) fn post_pending_approval(post: &Post, club: &Club) -> Notification {
        notification(
            NotificationKind::PostPendingApproval,
            club,
            RelatedEntity::Post(post.id),
            ("Post Pending Approval", "منشور بانتظار الموافقة"),
            (
                format!("{} submitted \"{}\" for review", club.name.base, post.title.base),
                format!(
                    "أرسل {} \"{}\" للمراجعة",
                    club.name.arabic_or_base(),
                    post.title.arabic_or_base()
                ),
            ),
        )
    }

    pub(crate) fn post_approved(post: &Post, club: &Club) -> Notification {
        notification(
            NotificationKind::PostApproved,
            club,
            RelatedEntity::Post(post.id),
            ("Post Approved", "تمت الموافقة على المنشور"),
            (
                format!("\"{}\" has been approved", post.title.base),
                format!("تمت الموافقة على \"{}\"", post.title.arabic_or_base()),
            ),
        )
    }

    pub(crate) fn new_post(post: &Post, club: &Club) -> Notification {
        notification(
            NotificationKind::NewPost,
            club,
            RelatedEntity::Post(post.id),
            ("New Post", "منشور جديد"),
            (
                format!("{}: {}", club.name.base, post.title.base),
                format!("{}: {}", club.name.arabic_or_base(), post.title.arabic_or_base()),
            ),
        )
    }

    pub(crate) fn post_rejected(post: &Post, club: &Club, reason: &str) -> Notification {
        notification(
            NotificationKind::PostRejected,
            club,
            RelatedEntity::Post(post.id),
            ("Post Rejected", "تم رفض المنشور"),
            (
                format!("\"{}\" was rejected: {}", post.title.base, reason),
                format!("تم رفض \"{}\": {}", post.title.arabic_or_base(), reason),
            ),
        )
    }

    pub(crate) fn new_event(event: &Event, club: &Club) -> Notification {
        notification(
            NotificationKind::NewEvent,
            club,
            RelatedEntity::Event(event.id),
            ("New Event", "فعالية جديدة"),
            (
                format!("{} added \"{}\" at {}", club.name.base, event.title.base, event.location.base),
                format!(
                    "أضاف {} \"{}\" في {}",
                    club.name.arabic_or_base(),
                    event.title.arabic_or_base(),
                    event.location.arabic_or_base()
                ),
            ),
        )
    }

    pub(crate) fn upcoming_event(event: &Event, club: &Club) -> Notification {
        let when = event.start_date.format("%Y-%m-%d %H:%M UTC");
        notification(
            NotificationKind::UpcomingEvent,
            club,
            RelatedEntity::Event(event.id),
            ("Upcoming Event", "فعالية قادمة"),
            (
                format!("\"{}\" starts {}", event.title.base, when),
                format!("تبدأ \"{}\" في {}", event.title.arabic_or_base(), when),
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::testing::{app_admin, club_admin, new_event, new_post, seeded};

    #[tokio::test]
    async fn test_visibility_per_role() {
        let (community, chess, debate) = seeded().await;
        let admin = app_admin();

        let chess_post = community
            .create_post(&admin, new_post(Some(chess.id)))
            .await
            .unwrap();
        let debate_post = community
            .create_post(&admin, new_post(Some(debate.id)))
            .await
            .unwrap();
        community.approve_post(&admin, chess_post.id).await.unwrap();
        community
            .reject_post(&admin, debate_post.id, "duplicate")
            .await
            .unwrap();
        community
            .create_event(&admin, new_event(Some(debate.id)))
            .await
            .unwrap();

        // pending x2, approved, new post, rejected, new event
        assert_eq!(community.visible_to(&admin, None).await.len(), 6);

        let anonymous = community.visible_to(&Session::anonymous(), None).await;
        let kinds: HashSet<_> = anonymous.iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            HashSet::from([NotificationKind::NewPost, NotificationKind::NewEvent])
        );

        let debate_feed = community.visible_to(&club_admin(debate.id), None).await;
        assert_eq!(debate_feed.len(), 4);
        assert!(debate_feed
            .iter()
            .all(|n| n.kind.is_public() || n.club_id == debate.id));
        assert!(debate_feed
            .iter()
            .any(|n| n.kind == NotificationKind::PostRejected));
        assert!(!debate_feed
            .iter()
            .any(|n| n.kind == NotificationKind::PostApproved));
    }

    #[tokio::test]
    async fn test_category_filter() {
        let (community, chess, _) = seeded().await;
        let admin = app_admin();
        let post = community
            .create_post(&admin, new_post(Some(chess.id)))
            .await
            .unwrap();
        community.approve_post(&admin, post.id).await.unwrap();
        community
            .create_event(&admin, new_event(Some(chess.id)))
            .await
            .unwrap();

        let events = community
            .visible_to(&admin, Some(NotificationCategory::Events))
            .await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, NotificationKind::NewEvent);

        let approvals = community
            .visible_to(&admin, Some(NotificationCategory::Approvals))
            .await;
        assert_eq!(approvals.len(), 1);

        let rejected = community
            .visible_to(&admin, Some(NotificationCategory::Rejected))
            .await;
        assert!(rejected.is_empty());
    }

    #[tokio::test]
    async fn test_unread_count_after_mark_all_read() {
        let (community, chess, _) = seeded().await;
        let admin = app_admin();
        let post = community
            .create_post(&admin, new_post(Some(chess.id)))
            .await
            .unwrap();
        community.approve_post(&admin, post.id).await.unwrap();

        assert_eq!(community.unread_count(&admin).await, 3);
        assert_eq!(community.unread_count(&Session::anonymous()).await, 1);

        assert_eq!(community.mark_all_read().await, 3);
        for session in [admin.clone(), club_admin(chess.id), Session::anonymous()] {
            assert_eq!(community.unread_count(&session).await, 0);
        }

        community
            .create_event(&admin, new_event(Some(chess.id)))
            .await
            .unwrap();
        assert_eq!(community.unread_count(&Session::anonymous()).await, 1);
    }

    #[tokio::test]
    async fn test_mark_read_is_idempotent_and_scoped() {
        let (community, chess, _) = seeded().await;
        let admin = app_admin();
        community
            .create_post(&admin, new_post(Some(chess.id)))
            .await
            .unwrap();
        let pending = community.visible_to(&admin, None).await[0].id;

        // moderation notices are hidden from anonymous viewers
        let err = community
            .mark_read(&Session::anonymous(), pending)
            .await
            .unwrap_err();
        assert!(matches!(err, CommunityError::NotFound { .. }));

        community.mark_read(&admin, pending).await.unwrap();
        community.mark_read(&admin, pending).await.unwrap();
        assert_eq!(community.unread_count(&admin).await, 0);

        let err = community
            .mark_read(&admin, NotificationId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CommunityError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_upcoming_events_announced_once() {
        let (community, chess, _) = seeded().await;
        let admin = app_admin();
        let now = Utc::now();

        let mut soon = new_event(Some(chess.id));
        soon.start_date = now + Duration::hours(2);
        soon.end_date = now + Duration::hours(4);
        let soon = community.create_event(&admin, soon).await.unwrap();

        let mut later = new_event(Some(chess.id));
        later.start_date = now + Duration::days(10);
        later.end_date = now + Duration::days(11);
        community.create_event(&admin, later).await.unwrap();

        assert_eq!(
            community
                .announce_upcoming_events(now, Duration::hours(24))
                .await,
            1
        );
        assert_eq!(
            community
                .announce_upcoming_events(now, Duration::hours(24))
                .await,
            0
        );

        let upcoming = community
            .visible_to(&Session::anonymous(), Some(NotificationCategory::Events))
            .await
            .into_iter()
            .filter(|n| n.kind == NotificationKind::UpcomingEvent)
            .collect::<Vec<_>>();
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].related_event(), Some(soon.id));
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!(
            "Events".parse::<NotificationCategory>().unwrap(),
            NotificationCategory::Events
        );
        assert!("everything".parse::<NotificationCategory>().is_err());
    }
}
