//! Startup roster: clubs and the administrators bound to them.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

use crate::{
    auth,
    domain::{
        models::{Administrator, ClubUpdate, Role, RoleKind},
        Community, StaticRegistry,
    },
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedClub {
    pub name: String,
    pub name_ar: Option<String>,
    pub description: String,
    pub description_ar: Option<String>,
    pub logo_url: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub registration_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedAdmin {
    pub username: String,
    /// Plaintext; hashed at load.
    pub password: Option<String>,
    /// Argon2 PHC string.
    pub password_hash: Option<String>,
    pub role: RoleKind,
    /// Name of the club a club admin manages.
    pub club: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub clubs: Vec<SeedClub>,
    #[serde(default)]
    pub admins: Vec<SeedAdmin>,
}

impl Seed {
    pub fn from_json(json: &str) -> anyhow::Result<Seed> {
        serde_json::from_str(json).context("seed file is not valid")
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Seed> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read seed file {}", path.display()))?;
        Seed::from_json(&json)
    }
}

fn credential(admin: &SeedAdmin) -> anyhow::Result<String> {
    match (&admin.password, &admin.password_hash) {
        (Some(_), Some(_)) => bail!(
            "administrator {} has both password and passwordHash",
            admin.username
        ),
        (None, None) => bail!("administrator {} has no credential", admin.username),
        (None, Some(hash)) => Ok(hash.clone()),
        (Some(password), None) => {
            warn!(username = %admin.username, "seed credential is plaintext; hashing at load");
            Ok(auth::hash_password(password)?)
        }
    }
}

/// Registers the seed's clubs and returns its administrators. Club admins are
/// bound to the id of the club they name; an unknown name aborts the load.
pub async fn load(community: &Community, seed: Seed) -> anyhow::Result<StaticRegistry> {
    for club in seed.clubs {
        let name = club.name.clone();
        community
            .register_club(ClubUpdate {
                name: club.name,
                name_ar: club.name_ar,
                description: club.description,
                description_ar: club.description_ar,
                logo_url: club.logo_url,
                email: club.email,
                website: club.website,
                registration_link: club.registration_link,
            })
            .await
            .with_context(|| format!("seed club {name} is invalid"))?;
    }

    let mut registry = StaticRegistry::default();
    for admin in seed.admins {
        let role = match (admin.role, &admin.club) {
            (RoleKind::AppAdmin, _) => Role::AppAdmin,
            (RoleKind::ClubAdmin, None) => {
                bail!("club admin {} does not name a club", admin.username)
            }
            (RoleKind::ClubAdmin, Some(name)) => match community.find_club_by_name(name).await {
                Some(club) => Role::ClubAdmin { club_id: club.id },
                None => bail!(
                    "club admin {} is affiliated with unknown club {name}",
                    admin.username
                ),
            },
        };
        let credential = credential(&admin)?;
        registry.insert(Administrator::new(admin.username, credential, role));
    }

    info!(
        clubs = community.list_clubs().await.len(),
        admins = registry.len(),
        "seed loaded"
    );
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AdminRegistry;

    const SEED: &str = r#"{
        "clubs": [
            { "name": "ToastMasters", "description": "Public speaking practice" },
            { "name": "TakeOne", "description": "Short films", "website": "https://takeone.example.com" }
        ],
        "admins": [
            { "username": "admin1", "password": "password1", "role": "app_admin" },
            { "username": "clubadmin2", "password": "clubpass2", "role": "club_admin", "club": "ToastMasters" }
        ]
    }"#;

    #[tokio::test]
    async fn test_load_resolves_affiliations_to_ids() {
        let community = Community::default();
        let registry = load(&community, Seed::from_json(SEED).unwrap())
            .await
            .unwrap();

        let toastmasters = community.find_club_by_name("ToastMasters").await.unwrap();
        let admin = registry.by_username("clubadmin2").unwrap();
        assert_eq!(admin.role, Role::ClubAdmin { club_id: toastmasters.id });
        assert!(auth::verify_password("clubpass2", &admin.credential).unwrap());
        assert!(registry.by_username("admin1").unwrap().is_app_admin());
        assert_eq!(community.list_clubs().await.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_affiliation_fails() {
        let seed = Seed::from_json(
            r#"{ "admins": [ { "username": "x", "password": "y", "role": "club_admin", "club": "Nope" } ] }"#,
        )
        .unwrap();
        let err = load(&Community::default(), seed).await.unwrap_err();
        assert!(err.to_string().contains("unknown club Nope"));
    }

    #[tokio::test]
    async fn test_admin_needs_exactly_one_credential() {
        let seed = Seed::from_json(r#"{ "admins": [ { "username": "x", "role": "app_admin" } ] }"#)
            .unwrap();
        assert!(load(&Community::default(), seed).await.is_err());
    }

    #[test]
    fn test_bundled_seed_parses() {
        let seed = Seed::from_file(concat!(env!("CARGO_MANIFEST_DIR"), "/seed.json")).unwrap();
        assert_eq!(seed.clubs.len(), 3);
        assert_eq!(seed.admins.len(), 5);
    }
}
