//! Member Service Library
//!
//! Members, teams and items over the generic data-access layer, exposed as
//! a small REST API. It can be run as a standalone service or embedded.

pub mod api;
pub mod config;
pub mod infra;
pub mod repository;
pub mod service;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;
use tracing::info;

use persistence::{AuditConfig, Persistence};

use crate::api::{create_router, AppState};
use crate::config::MemberServiceConfig;
use crate::infra::Database;
use crate::repository::{named_queries, MemberRepository};
use crate::service::{MemberManager, MemberService};

/// Run the member service as an embedded component.
pub async fn run_embedded(host: &str, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let config = MemberServiceConfig::from_env();
    run_server_with_config(host, port, config).await
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = MemberServiceConfig::from_env();
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Insert sample members once (for CLI commands).
pub async fn seed(count: Option<u32>) -> Result<(), Box<dyn std::error::Error>> {
    let config = MemberServiceConfig::from_env();
    let db = Database::connect(&config.database).await?;
    let count = count.unwrap_or(config.seed_count);

    let service = member_service(build_persistence(db.get_connection(), &config));
    service.seed_members(count).await?;
    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Unit-of-work factory with the member queries and the configured auditor.
pub fn build_persistence(connection: DatabaseConnection, config: &MemberServiceConfig) -> Persistence {
    let audit = match &config.auditor {
        Some(name) => AuditConfig::fixed(name.clone()),
        None => AuditConfig::new(),
    };

    Persistence::new(connection)
        .with_named_queries(named_queries())
        .with_audit(audit)
}

fn member_service(persistence: Persistence) -> Arc<MemberManager> {
    Arc::new(MemberManager::new(persistence, Arc::new(MemberRepository::new())))
}

/// Build the HTTP application over `persistence`.
pub fn create_app(persistence: Persistence) -> Router {
    let member_service: Arc<dyn MemberService> = member_service(persistence.clone());
    create_router(AppState::new(member_service, persistence))
}

/// Run the HTTP server with the given configuration.
async fn run_server_with_config(
    host: &str,
    port: u16,
    config: MemberServiceConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize database
    let db = Database::connect(&config.database).await?;
    let persistence = build_persistence(db.get_connection(), &config);

    // Startup seeding hook
    if config.seed {
        member_service(persistence.clone())
            .seed_members(config.seed_count)
            .await?;
    }

    let app = create_app(persistence);

    // Build address
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Member service listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
