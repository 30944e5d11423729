//! Administrators, sessions and the authorization matrix.

use std::collections::HashMap;

use tracing::{info, warn};

use super::{
    error::{CommunityError, CommunityResult},
    models::{AdminId, Administrator, Club, Role},
};
use crate::auth;

/// Source of administrator identities. Injected so tests and deployments
/// can provide their own roster.
pub trait AdminRegistry: Send + Sync {
    fn by_username(&self, username: &str) -> Option<&Administrator>;
    fn by_id(&self, id: AdminId) -> Option<&Administrator>;
}

/// Fixed roster loaded at startup.
#[derive(Debug, Default)]
pub struct StaticRegistry {
    admins: Vec<Administrator>,
    by_username: HashMap<String, usize>,
}

impl StaticRegistry {
    pub fn new(admins: impl IntoIterator<Item = Administrator>) -> Self {
        let mut registry = Self::default();
        for admin in admins {
            registry.insert(admin);
        }
        registry
    }

    /// Adds an administrator, replacing any existing one with the same username.
    pub fn insert(&mut self, admin: Administrator) {
        match self.by_username.get(&admin.username) {
            Some(&index) => self.admins[index] = admin,
            None => {
                self.by_username.insert(admin.username.clone(), self.admins.len());
                self.admins.push(admin);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.admins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.admins.is_empty()
    }
}

impl AdminRegistry for StaticRegistry {
    fn by_username(&self, username: &str) -> Option<&Administrator> {
        self.by_username.get(username).map(|&i| &self.admins[i])
    }

    fn by_id(&self, id: AdminId) -> Option<&Administrator> {
        self.admins.iter().find(|a| a.id == id)
    }
}

/// Checks a username/credential pair against the registry.
///
/// Unknown usernames and wrong credentials produce the same error.
pub fn authenticate(
    registry: &dyn AdminRegistry,
    username: &str,
    credential: &str,
) -> CommunityResult<Administrator> {
    let Some(admin) = registry.by_username(username) else {
        warn!(username, "login rejected: unknown username");
        return Err(CommunityError::Authentication);
    };

    match auth::verify_password(credential, &admin.credential) {
        Ok(true) => {
            info!(username, admin_id = %admin.id, role = %admin.role.kind(), "administrator authenticated");
            Ok(admin.clone())
        }
        Ok(false) => {
            warn!(username, "login rejected: credential mismatch");
            Err(CommunityError::Authentication)
        }
        Err(e) => {
            warn!(username, error = %e, "login rejected: stored credential is not a valid hash");
            Err(CommunityError::Authentication)
        }
    }
}

/// The caller on whose behalf an engine operation runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    admin: Option<Administrator>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { admin: None }
    }

    pub fn authenticated(admin: Administrator) -> Self {
        Self { admin: Some(admin) }
    }

    /// Replaces the held administrator on success. A failed attempt leaves
    /// the session as it was.
    pub fn login(
        &mut self,
        registry: &dyn AdminRegistry,
        username: &str,
        credential: &str,
    ) -> CommunityResult<&Administrator> {
        let admin = authenticate(registry, username, credential)?;
        Ok(&*self.admin.insert(admin))
    }

    pub fn logout(&mut self) {
        if let Some(admin) = self.admin.take() {
            info!(username = %admin.username, "administrator logged out");
        }
    }

    pub fn admin(&self) -> Option<&Administrator> {
        self.admin.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.admin.is_some()
    }

    /// The administrator, or an authorization failure for `action`.
    pub(crate) fn require_admin(&self, action: &'static str) -> CommunityResult<&Administrator> {
        self.admin.as_ref().ok_or_else(|| {
            warn!(action, "denied: no administrator in session");
            CommunityError::Authorization(action)
        })
    }

    /// Whether the session may mutate content owned by `club`.
    pub fn can_mutate(&self, club: &Club) -> bool {
        self.admin
            .as_ref()
            .map_or(false, |admin| authorize_club_mutation(admin, club))
    }
}

pub fn authorize_club_mutation(admin: &Administrator, club: &Club) -> bool {
    match admin.role {
        Role::AppAdmin => true,
        Role::ClubAdmin { club_id } => club_id == club.id,
    }
}

/// The clubs whose content the session may manage.
pub fn authorize_club_scope<'a>(
    session: &Session,
    clubs: impl IntoIterator<Item = &'a Club>,
) -> Vec<&'a Club> {
    clubs.into_iter().filter(|c| session.can_mutate(c)).collect()
}
