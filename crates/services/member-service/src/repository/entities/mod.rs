//! SeaORM entities and their mapping onto domain types.

pub mod item;
pub mod member;
pub mod team;
