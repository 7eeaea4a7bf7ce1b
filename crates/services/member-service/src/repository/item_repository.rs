//! Item repository.

use persistence::CrudRepository;

use super::entities::item;

/// Item data access; CRUD only
#[derive(Debug, Default, Clone, Copy)]
pub struct ItemRepository;

impl ItemRepository {
    /// Create new repository instance
    pub fn new() -> Self {
        Self
    }
}

impl CrudRepository<item::Entity> for ItemRepository {}
