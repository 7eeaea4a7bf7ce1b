//! Unit of work bound to one database transaction.
//!
//! An `EntityManager` owns the transaction and the identity map. Pending
//! changes to tracked entities are written at flush, which happens before
//! every query, before bulk statements and at commit.

use std::sync::Arc;

use futures::future::BoxFuture;
use sea_orm::sea_query::{Alias, Expr, Query};
use sea_orm::{
    ConnectionTrait, DatabaseTransaction, DbBackend, EntityTrait, FromQueryResult, QueryTrait,
    Select, SelectTwo, Statement, TryGetable,
};
use tracing::debug;

use common::{AppError, AppResult};

use crate::entity::{entity_name, AuditConfig, Persistable};
use crate::identity_map::IdentityMap;
use crate::page::{Page, PageRequest};
use crate::projection::Projection;
use crate::query::{Arg, CountQuery, Optional, QuerySpec};
use crate::statement::{DeclaredQuery, Modifying, NamedQueries, NativeQuery, RawQuery};

/// Statements issued by one unit of work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatementStats {
    pub selects: u64,
    pub inserts: u64,
    pub updates: u64,
    pub deletes: u64,
    pub bulk_updates: u64,
}

impl StatementStats {
    pub fn total(&self) -> u64 {
        self.selects + self.inserts + self.updates + self.deletes + self.bulk_updates
    }
}

/// Tracks entities for the lifetime of one transaction.
///
/// Not shareable between tasks: every operation takes `&mut self`.
pub struct EntityManager {
    txn: DatabaseTransaction,
    identity_map: IdentityMap,
    audit: AuditConfig,
    named_queries: Arc<NamedQueries>,
    stats: StatementStats,
}

fn single_result<T>(mut rows: Vec<T>) -> AppResult<Option<T>> {
    if rows.len() > 1 {
        return Err(AppError::NonUniqueResult { actual: rows.len() });
    }
    Ok(rows.pop())
}

impl EntityManager {
    pub(crate) fn new(txn: DatabaseTransaction, audit: AuditConfig, named_queries: Arc<NamedQueries>) -> Self {
        Self {
            txn,
            identity_map: IdentityMap::new(),
            audit,
            named_queries,
            stats: StatementStats::default(),
        }
    }

    /// Underlying transaction, for statements the manager does not model
    pub fn connection(&self) -> &DatabaseTransaction {
        &self.txn
    }

    pub fn backend(&self) -> DbBackend {
        self.txn.get_database_backend()
    }

    pub fn statistics(&self) -> StatementStats {
        self.stats
    }

    /// Number of entities currently tracked
    pub fn tracked_count(&self) -> usize {
        self.identity_map.len()
    }

    /// Unbound copy of a registered named query
    pub fn named_query(&self, name: &str) -> AppResult<DeclaredQuery> {
        self.named_queries.get(name)
    }

    // =========================================================================
    // Entity lifecycle
    // =========================================================================

    /// Insert a new entity and start tracking it.
    ///
    /// Fails with a precondition error if the entity is not new.
    pub async fn persist<E: Persistable>(&mut self, mut entity: E::Domain) -> AppResult<E::Domain> {
        if !E::is_new(&entity) {
            return Err(AppError::precondition(format!(
                "{} is already persisted",
                entity_name::<E>()
            )));
        }
        E::on_create(&mut entity, &self.audit.stamp());
        self.insert_row::<E>(entity).await
    }

    async fn insert_row<E: Persistable>(&mut self, mut entity: E::Domain) -> AppResult<E::Domain> {
        let result = E::insert(E::to_active(&entity)).exec(&self.txn).await?;
        self.stats.inserts += 1;

        E::assign_id(&mut entity, result.last_insert_id);
        let id = E::id(&entity).ok_or_else(|| {
            AppError::internal(format!("Insert into {} produced no identifier", entity_name::<E>()))
        })?;

        debug!(entity = %entity_name::<E>(), id = ?id, "Inserted entity");
        self.identity_map.table::<E>()?.track(id, entity.clone(), false);
        Ok(entity)
    }

    /// Copy the state of a detached entity onto its tracked instance.
    ///
    /// An untracked entity is loaded first (one SELECT); if no row exists
    /// it is stamped like a new entity and inserted.
    pub async fn merge<E: Persistable>(&mut self, entity: E::Domain) -> AppResult<E::Domain> {
        let id = E::id(&entity).ok_or_else(|| {
            AppError::precondition(format!("Cannot merge a {} without an identifier", entity_name::<E>()))
        })?;

        if let Some(managed) = self.identity_map.table::<E>()?.get_mut(&id) {
            managed.current = entity.clone();
            return Ok(entity);
        }

        let existing = E::find_by_id(id.clone()).one(&self.txn).await?;
        self.stats.selects += 1;

        match existing {
            Some(model) => {
                let table = self.identity_map.table::<E>()?;
                table.track(id.clone(), E::from_model(model), false);
                if let Some(managed) = table.get_mut(&id) {
                    managed.current = entity.clone();
                }
                Ok(entity)
            }
            None => {
                let mut entity = entity;
                E::on_create(&mut entity, &self.audit.stamp());
                self.insert_row::<E>(entity).await
            }
        }
    }

    /// `persist` when the entity is new, `merge` otherwise
    pub async fn save<E: Persistable>(&mut self, entity: E::Domain) -> AppResult<E::Domain> {
        if E::is_new(&entity) {
            self.persist::<E>(entity).await
        } else {
            self.merge::<E>(entity).await
        }
    }

    /// Find by identifier; a tracked instance is returned without a query
    pub async fn find<E: Persistable>(&mut self, id: E::Id) -> AppResult<Option<E::Domain>> {
        if let Some(managed) = self.identity_map.table::<E>()?.get(&id) {
            return Ok(Some(managed.current.clone()));
        }

        let model = E::find_by_id(id).one(&self.txn).await?;
        self.stats.selects += 1;
        model.map(|model| self.attach::<E>(model, false)).transpose()
    }

    pub fn contains<E: Persistable>(&self, id: &E::Id) -> bool {
        self.identity_map
            .existing::<E>()
            .is_some_and(|table| table.get(id).is_some())
    }

    /// Stop tracking an entity; pending changes to it are discarded
    pub fn detach<E: Persistable>(&mut self, id: &E::Id) -> AppResult<bool> {
        Ok(self.identity_map.table::<E>()?.remove(id).is_some())
    }

    /// Delete a persisted entity.
    ///
    /// An entity that was never persisted is a precondition failure; a
    /// missing row is `NotFound`.
    pub async fn remove<E: Persistable>(&mut self, entity: &E::Domain) -> AppResult<()> {
        if E::is_new(entity) {
            return Err(AppError::precondition(format!(
                "Cannot delete a {} that was never persisted",
                entity_name::<E>()
            )));
        }
        let id = E::id(entity).ok_or_else(|| {
            AppError::precondition(format!("Cannot delete a {} without an identifier", entity_name::<E>()))
        })?;
        self.remove_by_id::<E>(id).await
    }

    pub async fn remove_by_id<E: Persistable>(&mut self, id: E::Id) -> AppResult<()> {
        self.identity_map.table::<E>()?.remove(&id);

        let result = E::delete_by_id(id.clone()).exec(&self.txn).await?;
        self.stats.deletes += 1;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        debug!(entity = %entity_name::<E>(), id = ?id, "Deleted entity");
        Ok(())
    }

    /// Write every dirty tracked entity, returning the number of rows updated
    pub async fn flush(&mut self) -> AppResult<u64> {
        let stamp = self.audit.stamp();
        let written = self.identity_map.flush(&self.txn, &stamp).await?;
        if written > 0 {
            self.stats.updates += written;
            debug!(written, "Flushed unit of work");
        }
        Ok(written)
    }

    /// Detach everything; pending changes are discarded
    pub fn clear(&mut self) {
        self.identity_map.clear();
    }

    /// Flush and commit
    pub async fn commit(mut self) -> AppResult<()> {
        self.flush().await?;
        let EntityManager { txn, stats, .. } = self;
        txn.commit().await?;
        debug!(?stats, "Unit of work committed");
        Ok(())
    }

    /// Discard pending changes and roll back
    pub async fn rollback(self) -> AppResult<()> {
        self.txn.rollback().await?;
        debug!("Unit of work rolled back");
        Ok(())
    }

    /// Commit on `Ok`, roll back on `Err`
    pub async fn complete<T>(self, result: AppResult<T>) -> AppResult<T> {
        match result {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(err)
            }
        }
    }

    /// Run `f` in this unit of work. Units of work do not nest: work that
    /// asks for a transaction while one is active joins it.
    pub async fn within<F, T>(&mut self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(&'a mut EntityManager) -> BoxFuture<'a, AppResult<T>> + Send,
        T: Send,
    {
        f(self).await
    }

    /// Track a loaded row. An already tracked instance wins over the row.
    fn attach<E: Persistable>(&mut self, model: E::Model, read_only: bool) -> AppResult<E::Domain> {
        let loaded = E::from_model(model);
        let Some(id) = E::id(&loaded) else {
            return Ok(loaded);
        };

        let table = self.identity_map.table::<E>()?;
        if let Some(managed) = table.get(&id) {
            return Ok(managed.current.clone());
        }
        table.track(id, loaded.clone(), read_only);
        Ok(loaded)
    }

    // =========================================================================
    // Entity queries
    // =========================================================================

    async fn run_select<E: Persistable>(&mut self, select: Select<E>, read_only: bool) -> AppResult<Vec<E::Domain>> {
        self.flush().await?;
        let models = select.all(&self.txn).await?;
        self.stats.selects += 1;
        models
            .into_iter()
            .map(|model| self.attach::<E>(model, read_only))
            .collect()
    }

    pub async fn select_list<E: Persistable>(&mut self, select: Select<E>) -> AppResult<Vec<E::Domain>> {
        self.run_select(select, false).await
    }

    /// Zero or one row; more is `NonUniqueResult`
    pub async fn select_nullable<E: Persistable>(&mut self, select: Select<E>) -> AppResult<Option<E::Domain>> {
        single_result(self.run_select(select, false).await?)
    }

    pub async fn select_page<E: Persistable>(
        &mut self,
        select: Select<E>,
        request: &PageRequest,
        count: CountQuery<E>,
    ) -> AppResult<Page<E::Domain>> {
        let content = self.run_select(request.apply(select.clone())?, false).await?;
        let total = self.page_total(request, content.len(), count, select).await?;
        Ok(Page::new(content, request, total))
    }

    /// Rows matched by `select`
    pub async fn count<E: EntityTrait>(&mut self, select: Select<E>) -> AppResult<u64> {
        self.flush().await?;
        let query = Query::select()
            .expr(Expr::cust("COUNT(*)"))
            .from_subquery(select.into_query(), Alias::new("sub_query"))
            .to_owned();
        let statement = self.backend().build(&query);
        self.count_statement(statement).await
    }

    async fn count_statement(&mut self, statement: Statement) -> AppResult<u64> {
        let row = self.txn.query_one(statement).await?;
        self.stats.selects += 1;
        let count: i64 = match row {
            Some(row) => row.try_get_by_index(0)?,
            None => 0,
        };
        Ok(count.max(0) as u64)
    }

    async fn page_total<E: Persistable>(
        &mut self,
        request: &PageRequest,
        content_len: usize,
        count: CountQuery<E>,
        derived: Select<E>,
    ) -> AppResult<u64> {
        if let Some(total) = request.total_from_content(content_len) {
            return Ok(total);
        }
        match count {
            CountQuery::Derived => self.count(derived).await,
            CountQuery::Select(select) => self.count(select).await,
            CountQuery::Native(query) => self.query_count(&query).await,
        }
    }

    /// Run a derived query returning every match
    pub async fn find_list<E: Persistable>(&mut self, spec: &QuerySpec<E>, args: &[Arg]) -> AppResult<Vec<E::Domain>> {
        let select = spec.to_select(args, self.backend())?;
        debug!(query = %spec.describe(), "Executing derived query");
        self.run_select(select, spec.is_read_only()).await
    }

    /// Run a derived query expecting zero or one match; zero is `None`
    pub async fn find_nullable<E: Persistable>(
        &mut self,
        spec: &QuerySpec<E>,
        args: &[Arg],
    ) -> AppResult<Option<E::Domain>> {
        single_result(self.find_list(spec, args).await?)
    }

    /// Run a derived query expecting zero or one match; zero is `Optional::Empty`
    pub async fn find_optional<E: Persistable>(
        &mut self,
        spec: &QuerySpec<E>,
        args: &[Arg],
    ) -> AppResult<Optional<E::Domain>> {
        Ok(self.find_nullable(spec, args).await?.into())
    }

    pub async fn find_page<E: Persistable>(
        &mut self,
        spec: &QuerySpec<E>,
        args: &[Arg],
        request: &PageRequest,
        count: CountQuery<E>,
    ) -> AppResult<Page<E::Domain>> {
        let select = request.apply(spec.to_select(args, self.backend())?)?;
        debug!(query = %spec.describe(), page = request.page(), size = request.size(), "Executing paged query");
        let content = self.run_select(select, spec.is_read_only()).await?;
        let total = self
            .page_total(request, content.len(), count, spec.to_filter(args)?)
            .await?;
        Ok(Page::new(content, request, total))
    }

    /// Load entities together with their related entity in one SELECT
    pub async fn fetch_join<E: Persistable, R: Persistable>(
        &mut self,
        select: SelectTwo<E, R>,
    ) -> AppResult<Vec<(E::Domain, Option<R::Domain>)>> {
        self.flush().await?;
        let rows = select.all(&self.txn).await?;
        self.stats.selects += 1;

        let mut loaded = Vec::with_capacity(rows.len());
        for (model, related) in rows {
            let entity = self.attach::<E>(model, false)?;
            let related = match related {
                Some(related) => Some(self.attach::<R>(related, false)?),
                None => None,
            };
            loaded.push((entity, related));
        }
        Ok(loaded)
    }

    /// Read a projection; results are not tracked
    pub async fn project<E, P>(&mut self, select: Select<E>) -> AppResult<Vec<P>>
    where
        E: EntityTrait,
        P: Projection<E>,
    {
        self.flush().await?;
        let rows = P::project(select).all(&self.txn).await?;
        self.stats.selects += 1;
        Ok(rows)
    }

    // =========================================================================
    // Declared and native queries
    // =========================================================================

    pub async fn query_list<E, Q>(&mut self, query: &Q) -> AppResult<Vec<E::Domain>>
    where
        E: Persistable,
        Q: RawQuery,
    {
        let statement = query.statement(self.backend())?;
        debug!(query = query.describe(), "Executing query");
        self.flush().await?;
        let models = E::find().from_raw_sql(statement).all(&self.txn).await?;
        self.stats.selects += 1;
        models
            .into_iter()
            .map(|model| self.attach::<E>(model, false))
            .collect()
    }

    pub async fn query_nullable<E, Q>(&mut self, query: &Q) -> AppResult<Option<E::Domain>>
    where
        E: Persistable,
        Q: RawQuery,
    {
        single_result(self.query_list::<E, Q>(query).await?)
    }

    /// Map result columns onto `P` by name
    pub async fn query_projection<P, Q>(&mut self, query: &Q) -> AppResult<Vec<P>>
    where
        P: FromQueryResult + Send + Sync,
        Q: RawQuery,
    {
        let statement = query.statement(self.backend())?;
        debug!(query = query.describe(), "Executing projection query");
        self.flush().await?;
        let rows = P::find_by_statement(statement).all(&self.txn).await?;
        self.stats.selects += 1;
        Ok(rows)
    }

    /// First column of every row
    pub async fn query_scalars<T, Q>(&mut self, query: &Q) -> AppResult<Vec<T>>
    where
        T: TryGetable + Send,
        Q: RawQuery,
    {
        let statement = query.statement(self.backend())?;
        debug!(query = query.describe(), "Executing scalar query");
        self.flush().await?;
        let rows = self.txn.query_all(statement).await?;
        self.stats.selects += 1;
        rows.iter()
            .map(|row| row.try_get_by_index::<T>(0).map_err(AppError::from))
            .collect()
    }

    /// Run a `SELECT COUNT(...)` query
    pub async fn query_count<Q: RawQuery>(&mut self, query: &Q) -> AppResult<u64> {
        let statement = query.statement(self.backend())?;
        self.flush().await?;
        self.count_statement(statement).await
    }

    /// Page a native projection query with a separate native count query
    pub async fn native_page<P>(
        &mut self,
        query: &NativeQuery,
        count: &NativeQuery,
        request: &PageRequest,
    ) -> AppResult<Page<P>>
    where
        P: FromQueryResult + Send + Sync,
    {
        let content = self.query_projection::<P, _>(&query.paged(request)?).await?;
        let total = match request.total_from_content(content.len()) {
            Some(total) => total,
            None => self.query_count(count).await?,
        };
        Ok(Page::new(content, request, total))
    }

    /// Run a bulk statement, returning the affected row count.
    ///
    /// Bulk statements bypass the identity map: unless the statement clears
    /// automatically, tracked entities keep their pre-statement state.
    pub async fn execute_update(&mut self, modifying: &Modifying) -> AppResult<u64> {
        self.flush().await?;
        let statement = modifying.query().statement(self.backend())?;
        let affected = self.txn.execute(statement).await?.rows_affected();
        self.stats.bulk_updates += 1;

        if modifying.clears_automatically() {
            self.clear();
        }
        debug!(affected, query = modifying.query().sql(), "Executed bulk statement");
        Ok(affected)
    }
}
