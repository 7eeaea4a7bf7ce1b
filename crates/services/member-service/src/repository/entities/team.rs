//! Team database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::{NotSet, Set};

use domain::{Auditing, Team};
use persistence::Persistable;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "team")]
pub struct Model {
    #[sea_orm(primary_key, column_name = "team_id")]
    pub id: i32,
    pub name: String,
    pub created_date: Option<DateTimeUtc>,
    pub last_modified_date: Option<DateTimeUtc>,
    pub created_by: Option<String>,
    pub last_modified_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::member::Entity")]
    Member,
}

impl Related<super::member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Member.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity; the member collection starts unloaded
impl From<Model> for Team {
    fn from(model: Model) -> Self {
        Team {
            id: Some(model.id),
            name: model.name,
            member_ids: Vec::new(),
            auditing: Auditing {
                created_date: model.created_date,
                last_modified_date: model.last_modified_date,
                created_by: model.created_by,
                last_modified_by: model.last_modified_by,
            },
        }
    }
}

impl Persistable for Entity {
    type Domain = Team;
    type Active = ActiveModel;
    type Id = i32;

    fn id(team: &Team) -> Option<i32> {
        team.id
    }

    fn assign_id(team: &mut Team, id: i32) {
        team.id = Some(id);
    }

    fn from_model(model: Model) -> Team {
        Team::from(model)
    }

    fn to_active(team: &Team) -> ActiveModel {
        ActiveModel {
            id: team.id.map_or(NotSet, Set),
            name: Set(team.name.clone()),
            created_date: Set(team.auditing.created_date),
            last_modified_date: Set(team.auditing.last_modified_date),
            created_by: Set(team.auditing.created_by.clone()),
            last_modified_by: Set(team.auditing.last_modified_by.clone()),
        }
    }
}
