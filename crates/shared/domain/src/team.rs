//! Team domain entity.

use serde::{Deserialize, Serialize};

use crate::auditing::{AuditStamp, Auditable, Auditing};

/// Team domain entity
///
/// `member_ids` is the inverse side of `Member::team_id`. It is not stored;
/// the persistence layer fills it on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: Option<i32>,
    pub name: String,
    #[serde(default)]
    pub member_ids: Vec<i32>,
    #[serde(skip)]
    pub auditing: Auditing,
}

impl Team {
    /// Create a transient team
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            member_ids: Vec::new(),
            auditing: Auditing::default(),
        }
    }

    /// Check if the team has been persisted
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Check if a member id is part of the loaded collection
    pub fn has_member(&self, member_id: i32) -> bool {
        self.member_ids.contains(&member_id)
    }

    pub(crate) fn add_member(&mut self, member_id: i32) {
        if !self.has_member(member_id) {
            self.member_ids.push(member_id);
        }
    }

    pub(crate) fn remove_member(&mut self, member_id: i32) {
        self.member_ids.retain(|id| *id != member_id);
    }
}

impl Auditable for Team {
    fn on_create(&mut self, stamp: &AuditStamp) {
        self.auditing.stamp_created(stamp);
    }

    fn on_update(&mut self, stamp: &AuditStamp) {
        self.auditing.stamp_modified(stamp);
    }
}
