//! Repository layer for data access.

mod custom_member_repository;
pub mod entities;
mod item_repository;
pub mod member_example;
mod member_repository;
pub mod member_spec;
pub mod projections;
mod team_repository;

pub use custom_member_repository::{CustomMemberRepository, CustomMemberRepositoryImpl};
pub use item_repository::ItemRepository;
pub use member_example::{MemberExample, MemberPath};
pub use member_repository::{named_queries, MemberRepository, FIND_BY_USERNAME};
pub use projections::{MemberProjection, NestedClosedProjection, UsernameOnly};
pub use team_repository::TeamRepository;
