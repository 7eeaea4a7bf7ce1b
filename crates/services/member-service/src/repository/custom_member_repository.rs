//! Hand-written member queries.
//!
//! `MemberRepository` is built with an implementation of this trait and
//! delegates to it, so callers see a single repository.

use async_trait::async_trait;

use common::AppResult;
use domain::Member;
use persistence::{DeclaredQuery, EntityManager};

use super::entities::member;

/// Queries that derivation and declarations cannot express
#[async_trait]
pub trait CustomMemberRepository: Send + Sync {
    async fn find_member_custom(&self, em: &mut EntityManager) -> AppResult<Vec<Member>>;
}

/// Default `CustomMemberRepository`, running plain SQL through the unit of work
#[derive(Debug, Default, Clone, Copy)]
pub struct CustomMemberRepositoryImpl;

#[async_trait]
impl CustomMemberRepository for CustomMemberRepositoryImpl {
    async fn find_member_custom(&self, em: &mut EntityManager) -> AppResult<Vec<Member>> {
        let query = DeclaredQuery::new("SELECT * FROM member m ORDER BY m.member_id");
        em.query_list::<member::Entity, _>(&query).await
    }
}
