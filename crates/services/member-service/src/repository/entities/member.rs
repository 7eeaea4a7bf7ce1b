//! Member database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::{NotSet, Set};

use domain::{Auditing, Member};
use persistence::Persistable;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "member")]
pub struct Model {
    #[sea_orm(primary_key, column_name = "member_id")]
    pub id: i32,
    pub username: String,
    pub age: i32,
    /// Many-to-one reference to `team` (NULL = no team)
    pub team_id: Option<i32>,
    pub created_date: Option<DateTimeUtc>,
    pub last_modified_date: Option<DateTimeUtc>,
    pub created_by: Option<String>,
    pub last_modified_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::team::Entity",
        from = "Column::TeamId",
        to = "super::team::Column::Id",
        on_delete = "SetNull"
    )]
    Team,
}

impl Related<super::team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for Member {
    fn from(model: Model) -> Self {
        Member {
            id: Some(model.id),
            username: model.username,
            age: model.age,
            team_id: model.team_id,
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
    type Domain = Member;
    type Active = ActiveModel;
    type Id = i32;

    fn id(member: &Member) -> Option<i32> {
        member.id
    }

    fn assign_id(member: &mut Member, id: i32) {
        member.id = Some(id);
    }

    fn from_model(model: Model) -> Member {
        Member::from(model)
    }

    fn to_active(member: &Member) -> ActiveModel {
        ActiveModel {
            id: member.id.map_or(NotSet, Set),
            username: Set(member.username.clone()),
            age: Set(member.age),
            team_id: Set(member.team_id),
            created_date: Set(member.auditing.created_date),
            last_modified_date: Set(member.auditing.last_modified_date),
            created_by: Set(member.auditing.created_by.clone()),
            last_modified_by: Set(member.auditing.last_modified_by.clone()),
        }
    }
}
