//! Moderation and notification engine for club content.

pub mod directory;
pub mod error;
pub mod identity;
pub mod lifecycle;
pub mod models;
pub mod notifications;
pub mod queries;
pub mod store;
pub(crate) mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{CommunityError, CommunityResult};
pub use identity::{authenticate, AdminRegistry, Session, StaticRegistry};
pub use lifecycle::{Community, NO_REASON_PROVIDED};
pub use notifications::NotificationCategory;
pub use store::{MemoryStore, Store};
