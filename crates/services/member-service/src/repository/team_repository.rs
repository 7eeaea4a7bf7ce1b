//! Team repository and the loader for the team's member collection.

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use common::{AppError, AppResult};
use domain::{Member, Team};
use persistence::{Arg, CrudRepository, EntityManager, Operator, QuerySpec};

use super::entities::{member, team};

/// Team data access
#[derive(Debug, Default, Clone, Copy)]
pub struct TeamRepository;

impl TeamRepository {
    /// Create new repository instance
    pub fn new() -> Self {
        Self
    }

    pub async fn find_by_name(&self, em: &mut EntityManager, name: &str) -> AppResult<Option<Team>> {
        let spec = QuerySpec::<team::Entity>::find_by(team::Column::Name, Operator::Equals);
        em.find_nullable(&spec, &[Arg::value(name)]).await
    }

    /// Members whose team reference points at `team_id`, in id order
    pub async fn find_members(&self, em: &mut EntityManager, team_id: i32) -> AppResult<Vec<Member>> {
        let select = member::Entity::find()
            .filter(member::Column::TeamId.eq(team_id))
            .order_by_asc(member::Column::Id);
        em.select_list(select).await
    }

    /// Fill `team.member_ids` from storage and return the members.
    ///
    /// The collection is the inverse side of `Member::team_id`; it is only
    /// ever read, never written.
    pub async fn load_members(&self, em: &mut EntityManager, team: &mut Team) -> AppResult<Vec<Member>> {
        let team_id = team
            .id
            .ok_or_else(|| AppError::precondition("Cannot load the members of an unsaved team"))?;

        let members = self.find_members(em, team_id).await?;
        team.member_ids = members.iter().filter_map(|member| member.id).collect();
        Ok(members)
    }
}

impl CrudRepository<team::Entity> for TeamRepository {}
