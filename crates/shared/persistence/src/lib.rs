//! Persistence layer: unit of work, identity map and repository contracts
//! over SeaORM.
//!
//! A `Persistence` hands out `EntityManager`s, one per transaction. The
//! manager tracks every entity it loads or saves; changes to tracked
//! entities are written at flush without an explicit update call.

pub mod entity;
pub mod entity_manager;
mod identity_map;
pub mod page;
pub mod projection;
pub mod query;
pub mod repository;
pub mod specification;
pub mod statement;
pub mod unit_of_work;

pub use entity::{AuditConfig, Persistable};
pub use entity_manager::{EntityManager, StatementStats};
pub use page::{Direction, Order, Page, PageRequest, Sort};
pub use projection::Projection;
pub use query::{Arg, CountQuery, LockMode, Operator, Optional, QuerySpec};
pub use repository::{CrudRepository, SpecificationExecutor};
pub use specification::Specification;
pub use statement::{DeclaredQuery, Modifying, NamedQueries, NativeQuery, RawQuery};
pub use unit_of_work::Persistence;
