//! Domain layer - Core entities and value objects of the member directory.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! Entities reference each other by identifier; loading related entities is
//! the job of the persistence layer.

pub mod auditing;
pub mod constants;
pub mod error;
pub mod item;
pub mod member;
pub mod team;

pub use auditing::{AuditStamp, Auditable, Auditing};
pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use item::Item;
pub use member::{Member, MemberDto};
pub use team::Team;
