//! Item database entity for SeaORM.
//!
//! Items carry a client-supplied identifier, so "new" means "never stamped
//! with a creation date" rather than "no identifier".

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use domain::Item;
use persistence::Persistable;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "item")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub created_date: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Item {
    fn from(model: Model) -> Self {
        Item {
            id: model.id,
            created_date: model.created_date,
        }
    }
}

impl Persistable for Entity {
    type Domain = Item;
    type Active = ActiveModel;
    type Id = String;

    fn id(item: &Item) -> Option<String> {
        Some(item.id.clone())
    }

    fn assign_id(item: &mut Item, id: String) {
        item.id = id;
    }

    fn from_model(model: Model) -> Item {
        Item::from(model)
    }

    fn to_active(item: &Item) -> ActiveModel {
        ActiveModel {
            id: Set(item.id.clone()),
            created_date: Set(item.created_date),
        }
    }

    fn is_new(item: &Item) -> bool {
        item.is_new()
    }
}
