//! Storage interface for club-scoped entities.

use super::models::{
    Club, ClubId, Event, EventId, Notification, NotificationId, Post, PostId,
};

pub type Iter<'a, T> = Box<dyn Iterator<Item = &'a T> + 'a>;

/// Entity storage used by the engine. Implementations are driven from inside
/// the engine's critical section and never see concurrent calls.
pub trait Store: Send {
    fn insert_club(&mut self, club: Club);
    fn club(&self, id: ClubId) -> Option<&Club>;
    fn club_mut(&mut self, id: ClubId) -> Option<&mut Club>;
    /// Clubs in insertion order.
    fn clubs(&self) -> Iter<'_, Club>;

    fn insert_post(&mut self, post: Post);
    fn post(&self, id: PostId) -> Option<&Post>;
    fn post_mut(&mut self, id: PostId) -> Option<&mut Post>;
    fn remove_post(&mut self, id: PostId) -> Option<Post>;
    fn posts(&self) -> Iter<'_, Post>;

    fn insert_event(&mut self, event: Event);
    fn event(&self, id: EventId) -> Option<&Event>;
    fn events(&self) -> Iter<'_, Event>;

    /// Appends to the notification log. Entries are never removed.
    fn append_notification(&mut self, notification: Notification);
    fn notification_mut(&mut self, id: NotificationId) -> Option<&mut Notification>;
    fn notifications(&self) -> Iter<'_, Notification>;
    fn mark_all_notifications_read(&mut self) -> usize;
}

/// Vec-backed store. Lookups are linear scans, adequate for hundreds of
/// clubs and posts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    clubs: Vec<Club>,
    posts: Vec<Post>,
    events: Vec<Event>,
    notifications: Vec<Notification>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn insert_club(&mut self, club: Club) {
        self.clubs.push(club);
    }

    fn club(&self, id: ClubId) -> Option<&Club> {
        self.clubs.iter().find(|c| c.id == id)
    }

    fn club_mut(&mut self, id: ClubId) -> Option<&mut Club> {
        self.clubs.iter_mut().find(|c| c.id == id)
    }

    fn clubs(&self) -> Iter<'_, Club> {
        Box::new(self.clubs.iter())
    }

    fn insert_post(&mut self, post: Post) {
        self.posts.push(post);
    }

    fn post(&self, id: PostId) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    fn post_mut(&mut self, id: PostId) -> Option<&mut Post> {
        self.posts.iter_mut().find(|p| p.id == id)
    }

    fn remove_post(&mut self, id: PostId) -> Option<Post> {
        let index = self.posts.iter().position(|p| p.id == id)?;
        Some(self.posts.remove(index))
    }

    fn posts(&self) -> Iter<'_, Post> {
        Box::new(self.posts.iter())
    }

    fn insert_event(&mut self, event: Event) {
        self.events.push(event);
    }

    fn event(&self, id: EventId) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    fn events(&self) -> Iter<'_, Event> {
        Box::new(self.events.iter())
    }

    fn append_notification(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    fn notification_mut(&mut self, id: NotificationId) -> Option<&mut Notification> {
        self.notifications.iter_mut().find(|n| n.id == id)
    }

    fn notifications(&self) -> Iter<'_, Notification> {
        Box::new(self.notifications.iter())
    }

    fn mark_all_notifications_read(&mut self) -> usize {
        let mut marked = 0;
        for notification in self.notifications.iter_mut().filter(|n| !n.is_read) {
            notification.is_read = true;
            marked += 1;
        }
        marked
    }
}
