//! Unit of Work factory.
//!
//! `Persistence` owns the connection pool and the configuration every unit
//! of work shares (auditing, named queries), and hands out `EntityManager`s
//! bound to fresh transactions.

use std::sync::Arc;

use futures::future::BoxFuture;
use sea_orm::{
    AccessMode, ConnectionTrait, DatabaseConnection, DbBackend, IsolationLevel, Statement,
    TransactionTrait,
};

use common::{AppError, AppResult};

use crate::entity::AuditConfig;
use crate::entity_manager::EntityManager;
use crate::statement::NamedQueries;

/// Creates units of work over one database.
#[derive(Clone)]
pub struct Persistence {
    db: DatabaseConnection,
    audit: AuditConfig,
    named_queries: Arc<NamedQueries>,
}

impl Persistence {
    /// Create new Persistence instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            audit: AuditConfig::new(),
            named_queries: Arc::new(NamedQueries::new()),
        }
    }

    pub fn with_audit(mut self, audit: AuditConfig) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_named_queries(mut self, named_queries: NamedQueries) -> Self {
        self.named_queries = Arc::new(named_queries);
        self
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Check database connectivity by executing a simple query.
    pub async fn ping(&self) -> AppResult<()> {
        self.db
            .execute(Statement::from_string(
                self.db.get_database_backend(),
                "SELECT 1".to_string(),
            ))
            .await?;
        Ok(())
    }

    /// Begin a unit of work with ReadCommitted isolation
    pub async fn begin(&self) -> AppResult<EntityManager> {
        self.begin_with(IsolationLevel::ReadCommitted).await
    }

    /// Begin a unit of work with Serializable isolation
    pub async fn begin_serializable(&self) -> AppResult<EntityManager> {
        self.begin_with(IsolationLevel::Serializable).await
    }

    async fn begin_with(&self, isolation: IsolationLevel) -> AppResult<EntityManager> {
        // SQLite ignores isolation settings and logs a warning for each one
        let txn = if self.db.get_database_backend() == DbBackend::Sqlite {
            self.db.begin().await
        } else {
            self.db
                .begin_with_config(Some(isolation), Some(AccessMode::ReadWrite))
                .await
        }
        .map_err(AppError::from)?;

        Ok(EntityManager::new(
            txn,
            self.audit.clone(),
            self.named_queries.clone(),
        ))
    }

    /// Execute a closure within a unit of work.
    ///
    /// Committed (after a final flush) on success, rolled back on error.
    pub async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(&'a mut EntityManager) -> BoxFuture<'a, AppResult<T>> + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::ReadCommitted, f).await
    }

    /// Execute a closure within a unit of work with serializable isolation.
    pub async fn transaction_serializable<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(&'a mut EntityManager) -> BoxFuture<'a, AppResult<T>> + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::Serializable, f).await
    }

    async fn execute_transaction<F, T>(&self, isolation: IsolationLevel, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(&'a mut EntityManager) -> BoxFuture<'a, AppResult<T>> + Send,
        T: Send,
    {
        let mut em = self.begin_with(isolation).await?;
        let result = f(&mut em).await;
        em.complete(result).await
    }
}

/// Run a block inside a unit of work.
///
/// ```rust,ignore
/// let member = with_unit_of_work!(persistence, |em| {
///     members.save(em, Member::new("member1", 10)).await
/// })?;
/// ```
#[macro_export]
macro_rules! with_unit_of_work {
    ($persistence:expr, |$em:ident| $body:expr) => {
        $persistence
            .transaction(|$em| ::std::boxed::Box::pin(async move { $body }))
            .await
    };
}
