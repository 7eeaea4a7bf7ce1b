//! Item domain entity with a client-supplied identifier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auditing::{AuditStamp, Auditable};

/// Item domain entity
///
/// The identifier is assigned by the caller, so it cannot tell new from
/// persisted. The creation timestamp does: it is absent until the first
/// insert stamps it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub created_date: Option<DateTime<Utc>>,
}

impl Item {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_date: None,
        }
    }

    /// True until the item has been inserted
    pub fn is_new(&self) -> bool {
        self.created_date.is_none()
    }
}

impl Auditable for Item {
    fn on_create(&mut self, stamp: &AuditStamp) {
        self.created_date = Some(stamp.at);
    }
}
