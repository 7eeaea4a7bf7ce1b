//! Composable predicates over an entity's select.

use std::fmt;
use std::sync::Arc;

use sea_orm::{EntityTrait, Select};

type Predicate<E> = Arc<dyn Fn(Select<E>) -> Select<E> + Send + Sync>;

/// A reusable filter that can add joins and conditions to a select.
///
/// An empty specification leaves the select untouched, which lets callers
/// build a filter from optional inputs.
pub struct Specification<E: EntityTrait> {
    predicates: Vec<Predicate<E>>,
}

impl<E: EntityTrait> Specification<E> {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(Select<E>) -> Select<E> + Send + Sync + 'static,
    {
        Self {
            predicates: vec![Arc::new(predicate)],
        }
    }

    /// Matches every row
    pub fn none() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }

    /// Both `self` and `other` must hold
    pub fn and(mut self, other: Specification<E>) -> Self {
        self.predicates.extend(other.predicates);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn apply(&self, select: Select<E>) -> Select<E> {
        self.predicates
            .iter()
            .fold(select, |select, predicate| predicate(select))
    }
}

impl<E: EntityTrait> Clone for Specification<E> {
    fn clone(&self) -> Self {
        Self {
            predicates: self.predicates.clone(),
        }
    }
}

impl<E: EntityTrait> Default for Specification<E> {
    fn default() -> Self {
        Self::none()
    }
}

impl<E: EntityTrait> fmt::Debug for Specification<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Specification")
            .field("predicates", &self.predicates.len())
            .finish()
    }
}
