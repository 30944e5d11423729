//! Fixtures shared by the engine's unit tests.

use chrono::{Duration, Utc};

use super::{
    identity::Session,
    lifecycle::Community,
    models::{Administrator, Club, ClubId, ClubUpdate, NewEvent, NewPost, Role, Translated},
};

pub(crate) fn app_admin() -> Session {
    Session::authenticated(Administrator::new("admin1", "unused", Role::AppAdmin))
}

pub(crate) fn club_admin(club_id: ClubId) -> Session {
    Session::authenticated(Administrator::new(
        "clubadmin1",
        "unused",
        Role::ClubAdmin { club_id },
    ))
}

pub(crate) fn club_fields(name: &str) -> ClubUpdate {
    ClubUpdate {
        name: name.to_string(),
        description: format!("{name} meets every week"),
        ..ClubUpdate::default()
    }
}

/// An engine with a "Chess Club" and a "Debate Club".
pub(crate) async fn seeded() -> (Community, Club, Club) {
    let community = Community::default();
    let chess = community
        .register_club(club_fields("Chess Club"))
        .await
        .unwrap();
    let debate = community
        .register_club(club_fields("Debate Club"))
        .await
        .unwrap();
    (community, chess, debate)
}

pub(crate) fn new_post(club_id: Option<ClubId>) -> NewPost {
    NewPost {
        club_id,
        title: Translated::new("Spring Tournament".to_string(), Some("بطولة الربيع".to_string())),
        description: Translated::base_only("Open to all students".to_string()),
        content: Translated::base_only("Sign up at the club desk before Friday.".to_string()),
        image: None,
    }
}

pub(crate) fn new_event(club_id: Option<ClubId>) -> NewEvent {
    let start_date = Utc::now() + Duration::days(3);
    NewEvent {
        club_id,
        title: Translated::base_only("Weekly Meetup".to_string()),
        description: Translated::base_only("Casual games and practice".to_string()),
        location: Translated::base_only("Student Center, Room 4".to_string()),
        start_date,
        end_date: start_date + Duration::hours(2),
        is_all_day: false,
    }
}
