//! Projections: partial views of an entity read straight into a struct.
//!
//! Projections are not tracked by the unit of work. Result columns map to
//! fields by name, so query aliases must match field names.

use sea_orm::{EntityTrait, FromQueryResult, Select, SelectModel, Selector};

/// A `FromQueryResult` struct that knows which columns of `E` to select.
pub trait Projection<E: EntityTrait>: FromQueryResult + Send + Sync + Sized {
    /// Narrow `select` to this projection's columns (and joins)
    fn project(select: Select<E>) -> Selector<SelectModel<Self>>;
}
