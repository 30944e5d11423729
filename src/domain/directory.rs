//! Club directory: registration, lookup and owner edits.

use tracing::{info, warn};
use validator::ValidationErrors;

use super::{
    error::{CommunityError, CommunityResult},
    identity::{authorize_club_mutation, authorize_club_scope, Session},
    lifecycle::Community,
    models::{Club, ClubId, ClubUpdate, Translated},
    store::Store,
    validation,
};

fn validate_update(update: &ClubUpdate) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    validation::require_text(&mut errors, "name", &update.name);
    validation::require_text(&mut errors, "description", &update.description);
    validation::optional_url(&mut errors, "logo_url", &update.logo_url);
    validation::optional_email(&mut errors, "email", &update.email);
    validation::optional_url(&mut errors, "website", &update.website);
    validation::optional_url(&mut errors, "registration_link", &update.registration_link);
    validation::finish(errors)
}

fn normalize(update: ClubUpdate) -> ClubUpdate {
    ClubUpdate {
        name: update.name.trim().to_string(),
        name_ar: validation::blank_to_none(update.name_ar),
        description: update.description.trim().to_string(),
        description_ar: validation::blank_to_none(update.description_ar),
        logo_url: validation::blank_to_none(update.logo_url),
        email: validation::blank_to_none(update.email),
        website: validation::blank_to_none(update.website),
        registration_link: validation::blank_to_none(update.registration_link),
    }
}

fn apply(club: &mut Club, update: ClubUpdate) {
    club.name = Translated::new(update.name, update.name_ar);
    club.description = Translated::new(update.description, update.description_ar);
    club.logo_url = update.logo_url;
    club.email = update.email;
    club.website = update.website;
    club.registration_link = update.registration_link;
}

impl<S: Store> Community<S> {
    /// Adds a club with a freshly generated id. Used when bootstrapping the
    /// directory; there is no caller-facing club creation.
    pub async fn register_club(&self, fields: ClubUpdate) -> CommunityResult<Club> {
        let fields = normalize(fields);
        validate_update(&fields)?;

        let mut club = Club {
            id: ClubId::new(),
            name: Translated::base_only(String::new()),
            description: Translated::base_only(String::new()),
            logo_url: None,
            email: None,
            website: None,
            registration_link: None,
        };
        apply(&mut club, fields);

        self.lock().await.insert_club(club.clone());
        info!(club_id = %club.id, name = %club.name.base, "club registered");
        Ok(club)
    }

    /// Replaces every mutable field of a club. The id never changes.
    pub async fn update_club(
        &self,
        session: &Session,
        club_id: ClubId,
        update: ClubUpdate,
    ) -> CommunityResult<Club> {
        let admin = session.require_admin("edit clubs")?;
        let mut store = self.lock().await;

        let club = store
            .club_mut(club_id)
            .ok_or_else(|| CommunityError::not_found("club", club_id))?;
        if !authorize_club_mutation(admin, club) {
            warn!(admin = %admin.username, %club_id, "denied: club edit outside scope");
            return Err(CommunityError::Authorization("edit this club"));
        }

        let update = normalize(update);
        validate_update(&update)?;
        apply(club, update);

        info!(%club_id, admin = %admin.username, "club updated");
        Ok(club.clone())
    }

    pub async fn get_club(&self, club_id: ClubId) -> Option<Club> {
        self.lock().await.club(club_id).cloned()
    }

    /// All clubs in registration order.
    pub async fn list_clubs(&self) -> Vec<Club> {
        self.lock().await.clubs().cloned().collect()
    }

    /// Clubs the session may manage.
    pub async fn clubs_in_scope(&self, session: &Session) -> Vec<Club> {
        let store = self.lock().await;
        authorize_club_scope(session, store.clubs())
            .into_iter()
            .cloned()
            .collect()
    }

    /// Resolves a club by its base or Arabic name.
    pub async fn find_club_by_name(&self, name: &str) -> Option<Club> {
        let store = self.lock().await;
        let found = store
            .clubs()
            .find(|c| c.name.base == name || c.name.arabic.as_deref() == Some(name))
            .cloned();
        found
    }
}
