//! Service layer - member use cases.

mod member_service;

#[cfg(any(test, feature = "test-utils"))]
pub use member_service::MockMemberService;
pub use member_service::{MemberManager, MemberService};
