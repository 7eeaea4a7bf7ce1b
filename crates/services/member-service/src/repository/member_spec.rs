//! Reusable member filters.
//!
//! Each builder returns the empty specification for a missing or blank
//! argument, so optional search inputs compose without branching.

use sea_orm::{ColumnTrait, JoinType, QueryFilter, QuerySelect, RelationTrait};

use persistence::Specification;

use super::entities::{member, team};

/// Members with exactly this username
pub fn username(username: Option<&str>) -> Specification<member::Entity> {
    match username.filter(|value| !value.trim().is_empty()) {
        Some(value) => {
            let value = value.to_string();
            Specification::new(move |select| select.filter(member::Column::Username.eq(value.clone())))
        }
        None => Specification::none(),
    }
}

/// Members whose team has this name (inner join)
pub fn team_name(team_name: Option<&str>) -> Specification<member::Entity> {
    match team_name.filter(|value| !value.trim().is_empty()) {
        Some(value) => {
            let value = value.to_string();
            Specification::new(move |select| {
                select
                    .join(JoinType::InnerJoin, member::Relation::Team.def())
                    .filter(team::Column::Name.eq(value.clone()))
            })
        }
        None => Specification::none(),
    }
}
