//! Identity map with snapshot-based dirty checking.
//!
//! Every tracked entity keeps the value it had when it was loaded (the
//! snapshot). Flush compares each entity with its snapshot and writes only
//! the columns that changed. Entities loaded with the read-only hint have no
//! snapshot and are never written.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseTransaction, EntityTrait, IdenStatic, Iterable, QueryFilter};

use common::{AppError, AppResult};
use domain::AuditStamp;

use crate::entity::{entity_name, primary_key_filter, Persistable};

/// A tracked entity.
#[derive(Debug, Clone)]
pub(crate) struct Managed<D> {
    pub current: D,
    /// `None` for read-only entities
    pub snapshot: Option<D>,
}

/// Tracked entities of one entity type.
pub(crate) struct Table<E: Persistable> {
    entries: HashMap<E::Id, Managed<E::Domain>>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Persistable> Table<E> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            _entity: PhantomData,
        }
    }

    pub fn get(&self, id: &E::Id) -> Option<&Managed<E::Domain>> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &E::Id) -> Option<&mut Managed<E::Domain>> {
        self.entries.get_mut(id)
    }

    /// Track `entity`; a read-only entity gets no snapshot
    pub fn track(&mut self, id: E::Id, entity: E::Domain, read_only: bool) {
        let snapshot = if read_only { None } else { Some(entity.clone()) };
        self.entries.insert(
            id,
            Managed {
                current: entity,
                snapshot,
            },
        );
    }

    pub fn remove(&mut self, id: &E::Id) -> Option<Managed<E::Domain>> {
        self.entries.remove(id)
    }
}

/// Columns whose value differs between two active models
fn changed_columns<E: Persistable>(before: &E::Active, after: &E::Active) -> Vec<E::Column> {
    E::Column::iter()
        .filter(|column| before.get(*column).into_value() != after.get(*column).into_value())
        .collect()
}

/// Type-erased view of a `Table<E>`.
#[async_trait]
pub(crate) trait TrackedTable: Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn len(&self) -> usize;

    /// Write dirty entities, returning how many rows were updated
    async fn flush(&mut self, txn: &DatabaseTransaction, stamp: &AuditStamp) -> AppResult<u64>;
}

#[async_trait]
impl<E: Persistable> TrackedTable for Table<E> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    async fn flush(&mut self, txn: &DatabaseTransaction, stamp: &AuditStamp) -> AppResult<u64> {
        let mut written = 0;

        for (id, managed) in self.entries.iter_mut() {
            let Some(snapshot) = managed.snapshot.as_ref() else {
                continue;
            };
            if *snapshot == managed.current {
                continue;
            }

            let before = E::to_active(snapshot);
            if changed_columns::<E>(&before, &E::to_active(&managed.current)).is_empty() {
                // only unmapped state changed
                managed.snapshot = Some(managed.current.clone());
                continue;
            }

            E::on_update(&mut managed.current, stamp);
            let mut active = E::to_active(&managed.current);
            let changed = changed_columns::<E>(&before, &active);
            for column in E::Column::iter() {
                if !changed.iter().any(|c| c.as_str() == column.as_str()) {
                    active.not_set(column);
                }
            }

            tracing::debug!(entity = %entity_name::<E>(), id = ?id, columns = changed.len(), "Flushing dirty entity");
            let result = E::update_many()
                .set(active)
                .filter(primary_key_filter::<E>(id.clone())?)
                .exec(txn)
                .await?;
            if result.rows_affected == 0 {
                tracing::warn!(entity = %entity_name::<E>(), id = ?id, "Dirty entity no longer exists");
                return Err(AppError::NotFound);
            }

            managed.snapshot = Some(managed.current.clone());
            written += 1;
        }

        Ok(written)
    }
}

/// All tracked entities of one unit of work, keyed by entity type.
#[derive(Default)]
pub(crate) struct IdentityMap {
    tables: HashMap<TypeId, Box<dyn TrackedTable>>,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table<E: Persistable>(&mut self) -> AppResult<&mut Table<E>> {
        self.tables
            .entry(TypeId::of::<E>())
            .or_insert_with(|| Box::new(Table::<E>::new()))
            .as_any_mut()
            .downcast_mut::<Table<E>>()
            .ok_or_else(|| AppError::internal("identity map table has an unexpected type"))
    }

    /// Table of `E`, if anything of that type was ever tracked
    pub fn existing<E: Persistable>(&self) -> Option<&Table<E>> {
        self.tables
            .get(&TypeId::of::<E>())
            .and_then(|table| table.as_any().downcast_ref::<Table<E>>())
    }

    /// Number of tracked entities across all types
    pub fn len(&self) -> usize {
        self.tables.values().map(|table| table.len()).sum()
    }

    pub fn clear(&mut self) {
        self.tables.clear();
    }

    pub async fn flush(&mut self, txn: &DatabaseTransaction, stamp: &AuditStamp) -> AppResult<u64> {
        let mut written = 0;
        for table in self.tables.values_mut() {
            written += table.flush(txn, stamp).await?;
        }
        Ok(written)
    }
}
