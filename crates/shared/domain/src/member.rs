//! Member domain entity and related types.

use serde::{Deserialize, Serialize};

use crate::auditing::{AuditStamp, Auditable, Auditing};
use crate::error::{DomainError, DomainResult};
use crate::team::Team;

/// Member domain entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: Option<i32>,
    pub username: String,
    pub age: i32,
    /// Many-to-one reference, nullable
    pub team_id: Option<i32>,
    #[serde(skip)]
    pub auditing: Auditing,
}

impl Member {
    /// Create a transient member without a team
    pub fn new(username: impl Into<String>, age: i32) -> Self {
        Self {
            id: None,
            username: username.into(),
            age,
            team_id: None,
            auditing: Auditing::default(),
        }
    }

    /// Create a transient member that joins `team`
    pub fn with_team(username: impl Into<String>, age: i32, team: &mut Team) -> DomainResult<Self> {
        let mut member = Self::new(username, age);
        member.change_team(team)?;
        Ok(member)
    }

    /// Check if the member has been persisted
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Join `team`, keeping both sides of the relationship consistent.
    ///
    /// The team must be persisted. The member's id is appended to the team's
    /// collection only once the member itself has an id: for a transient
    /// member, call this again after saving it, or reload the collection with
    /// `TeamRepository::load_members`.
    pub fn change_team(&mut self, team: &mut Team) -> DomainResult<()> {
        let team_id = team
            .id
            .ok_or_else(|| DomainError::validation("Team must be saved before members can join it"))?;

        self.team_id = Some(team_id);
        if let Some(id) = self.id {
            team.add_member(id);
        }
        Ok(())
    }

    /// Leave `team` if the member currently belongs to it
    pub fn leave_team(&mut self, team: &mut Team) {
        if self.team_id.is_some() && self.team_id == team.id {
            self.team_id = None;
            if let Some(id) = self.id {
                team.remove_member(id);
            }
        }
    }
}

impl Auditable for Member {
    fn on_create(&mut self, stamp: &AuditStamp) {
        self.auditing.stamp_created(stamp);
    }

    fn on_update(&mut self, stamp: &AuditStamp) {
        self.auditing.stamp_modified(stamp);
    }
}

/// Member listing row (safe to return to client)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct MemberDto {
    /// Member identifier
    pub id: i32,
    /// Member username
    pub username: String,
    /// Team name, when the team was loaded
    pub team_name: Option<String>,
}

impl MemberDto {
    pub fn new(id: i32, username: impl Into<String>, team_name: Option<String>) -> Self {
        Self {
            id,
            username: username.into(),
            team_name,
        }
    }
}

/// Listing conversion without team data
impl From<&Member> for MemberDto {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id.unwrap_or_default(),
            username: member.username.clone(),
            team_name: None,
        }
    }
}

impl From<Member> for MemberDto {
    fn from(member: Member) -> Self {
        MemberDto::from(&member)
    }
}
