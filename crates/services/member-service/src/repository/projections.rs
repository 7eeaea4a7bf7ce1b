//! Read-only views of members.
//!
//! Projections are never tracked. Field names must match the selected
//! column aliases.

use sea_orm::{FromQueryResult, JoinType, QuerySelect, RelationTrait, Select, SelectModel, Selector};

use domain::MemberDto;
use persistence::Projection;

use super::entities::{member, team};

/// Only the username column
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct UsernameOnly {
    pub username: String,
}

impl Projection<member::Entity> for UsernameOnly {
    fn project(select: Select<member::Entity>) -> Selector<SelectModel<Self>> {
        select
            .select_only()
            .column(member::Column::Username)
            .into_model::<Self>()
    }
}

/// Member with the name of its team.
///
/// Also the row shape of the member DTO queries.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct MemberProjection {
    pub id: i32,
    pub username: String,
    pub team_name: Option<String>,
}

impl Projection<member::Entity> for MemberProjection {
    fn project(select: Select<member::Entity>) -> Selector<SelectModel<Self>> {
        select
            .select_only()
            .column_as(member::Column::Id, "id")
            .column(member::Column::Username)
            .column_as(team::Column::Name, "team_name")
            .join(JoinType::LeftJoin, member::Relation::Team.def())
            .into_model::<Self>()
    }
}

impl From<MemberProjection> for MemberDto {
    fn from(projection: MemberProjection) -> Self {
        MemberDto::new(projection.id, projection.username, projection.team_name)
    }
}

/// Username plus the closed view of the member's team.
///
/// The team is always joined in full to read its name.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct NestedClosedProjection {
    pub username: String,
    pub team_name: Option<String>,
}

impl Projection<member::Entity> for NestedClosedProjection {
    fn project(select: Select<member::Entity>) -> Selector<SelectModel<Self>> {
        select
            .select_only()
            .column(member::Column::Username)
            .column_as(team::Column::Name, "team_name")
            .join(JoinType::LeftJoin, member::Relation::Team.def())
            .into_model::<Self>()
    }
}
