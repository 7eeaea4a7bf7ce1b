//! Creation and modification audit fields.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Who touched an entity and when.
///
/// Timestamps are truncated to microseconds so a stamped value survives a
/// round trip through the database unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditStamp {
    pub at: DateTime<Utc>,
    pub by: Option<String>,
}

impl AuditStamp {
    /// Stamp for the current instant
    pub fn now(by: Option<String>) -> Self {
        Self {
            at: Utc::now().trunc_subsecs(6),
            by,
        }
    }
}

/// Audit columns shared by `Member` and `Team`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auditing {
    pub created_date: Option<DateTime<Utc>>,
    pub last_modified_date: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub last_modified_by: Option<String>,
}

impl Auditing {
    /// Stamp all four fields (insert)
    pub fn stamp_created(&mut self, stamp: &AuditStamp) {
        self.created_date = Some(stamp.at);
        self.created_by = stamp.by.clone();
        self.stamp_modified(stamp);
    }

    /// Stamp the modification pair (update)
    pub fn stamp_modified(&mut self, stamp: &AuditStamp) {
        self.last_modified_date = Some(stamp.at);
        self.last_modified_by = stamp.by.clone();
    }
}

/// Lifecycle callbacks invoked by the unit of work before writing an entity.
pub trait Auditable {
    /// Called once before the entity is inserted.
    fn on_create(&mut self, _stamp: &AuditStamp) {}

    /// Called before a changed entity is written at flush.
    fn on_update(&mut self, _stamp: &AuditStamp) {}
}
