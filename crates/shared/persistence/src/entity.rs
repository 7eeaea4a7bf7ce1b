//! Mapping between SeaORM entities and domain types.

use std::fmt::{self, Debug};
use std::hash::Hash;
use std::str::FromStr;
use std::sync::Arc;

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, EntityTrait, Iterable, PrimaryKeyToColumn,
    PrimaryKeyTrait, Value,
};
use sea_orm::sea_query::SimpleExpr;

use common::{AppError, AppResult};
use domain::{AuditStamp, Auditable};

/// A SeaORM entity whose rows map onto a domain type managed by the unit of work.
///
/// Implemented on the SeaORM `Entity` of each table. Only single-column
/// primary keys are supported.
pub trait Persistable: EntityTrait {
    /// Domain type held in the identity map
    type Domain: Auditable + Clone + PartialEq + Debug + Send + Sync + 'static;

    /// Active model used for inserts and column-level updates
    type Active: ActiveModelTrait<Entity = Self> + ActiveModelBehavior + Send + 'static;

    /// Identifier of a persisted entity
    type Id: Clone
        + Eq
        + Hash
        + Debug
        + Send
        + Sync
        + Into<Value>
        + Into<<Self::PrimaryKey as PrimaryKeyTrait>::ValueType>
        + 'static;

    /// Identifier of the entity, if it has one
    fn id(entity: &Self::Domain) -> Option<Self::Id>;

    /// Store the identifier produced by an insert
    fn assign_id(entity: &mut Self::Domain, id: <Self::PrimaryKey as PrimaryKeyTrait>::ValueType);

    fn from_model(model: Self::Model) -> Self::Domain;

    /// Every column set, except a generated identifier that is still absent
    fn to_active(entity: &Self::Domain) -> Self::Active;

    /// Whether `save` inserts (true) or merges (false).
    ///
    /// Defaults to identifier absence. Entities with client-assigned
    /// identifiers override this.
    fn is_new(entity: &Self::Domain) -> bool {
        Self::id(entity).is_none()
    }

    /// Column for a sort property name
    fn sort_column(property: &str) -> Option<Self::Column> {
        Self::Column::from_str(property).ok()
    }

    fn on_create(entity: &mut Self::Domain, stamp: &AuditStamp) {
        entity.on_create(stamp);
    }

    fn on_update(entity: &mut Self::Domain, stamp: &AuditStamp) {
        entity.on_update(stamp);
    }
}

/// Table name of `E`, for messages
pub(crate) fn entity_name<E: EntityTrait>() -> String {
    E::default().table_name().to_string()
}

/// `primary_key = id`
pub(crate) fn primary_key_filter<E: Persistable>(id: E::Id) -> AppResult<SimpleExpr> {
    let column = E::PrimaryKey::iter()
        .next()
        .map(|key| key.into_column())
        .ok_or_else(|| AppError::internal(format!("{} has no primary key", entity_name::<E>())))?;

    Ok(column.eq(id))
}

/// Supplies the acting user for audit stamps.
#[derive(Clone, Default)]
pub struct AuditConfig {
    auditor: Option<Arc<dyn Fn() -> Option<String> + Send + Sync>>,
}

impl AuditConfig {
    /// No auditor: `created_by` / `last_modified_by` stay empty
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the acting user with `auditor` on every stamp
    pub fn with_auditor<F>(auditor: F) -> Self
    where
        F: Fn() -> Option<String> + Send + Sync + 'static,
    {
        Self {
            auditor: Some(Arc::new(auditor)),
        }
    }

    /// Always stamp `name` as the acting user
    pub fn fixed(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::with_auditor(move || Some(name.clone()))
    }

    pub fn stamp(&self) -> AuditStamp {
        AuditStamp::now(self.auditor.as_ref().and_then(|auditor| auditor()))
    }
}

impl Debug for AuditConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditConfig")
            .field("auditor", &self.auditor.is_some())
            .finish()
    }
}
