//! Shared setup for integration tests: an in-memory SQLite database with
//! every migration applied.

#![allow(dead_code)]

use common::DatabaseConfig;
use domain::{Member, Team};
use persistence::{AuditConfig, CrudRepository, EntityManager, Persistence};

use member_service_lib::infra::Database;
use member_service_lib::repository::{named_queries, MemberRepository, TeamRepository};

/// One connection: every connection to `sqlite::memory:` is a separate database
fn memory_config() -> DatabaseConfig {
    DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
    }
}

pub async fn setup() -> Persistence {
    setup_with_audit(AuditConfig::new()).await
}

pub async fn setup_with_audit(audit: AuditConfig) -> Persistence {
    let db = Database::connect(&memory_config())
        .await
        .expect("Failed to open in-memory database");

    Persistence::new(db.get_connection())
        .with_named_queries(named_queries())
        .with_audit(audit)
}

/// Save a team and committed members `(username, age)` in it
pub async fn seed_team(persistence: &Persistence, team_name: &str, members: &[(&str, i32)]) -> (Team, Vec<Member>) {
    let teams = TeamRepository::new();
    let repo = MemberRepository::new();

    let mut em = persistence.begin().await.unwrap();
    let mut team = teams.save(&mut em, Team::new(team_name)).await.unwrap();

    let mut saved = Vec::new();
    for (username, age) in members {
        let member = Member::with_team(*username, *age, &mut team).unwrap();
        saved.push(repo.save(&mut em, member).await.unwrap());
    }
    em.commit().await.unwrap();

    (team, saved)
}

/// Save committed members without a team
pub async fn seed_members(persistence: &Persistence, members: &[(&str, i32)]) -> Vec<Member> {
    let repo = MemberRepository::new();

    let mut em = persistence.begin().await.unwrap();
    let mut saved = Vec::new();
    for (username, age) in members {
        saved.push(repo.save(&mut em, Member::new(*username, *age)).await.unwrap());
    }
    em.commit().await.unwrap();

    saved
}

/// Fresh unit of work
pub async fn begin(persistence: &Persistence) -> EntityManager {
    persistence.begin().await.unwrap()
}
