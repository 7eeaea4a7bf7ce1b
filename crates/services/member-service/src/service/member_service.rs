//! Member service - Handles member-related use cases.
//!
//! Each call runs in its own unit of work.

use std::sync::Arc;

use async_trait::async_trait;

use common::{AppResult, OptionExt};
use domain::{seed_username, Member, MemberDto};
use persistence::{CrudRepository, Page, PageRequest, Persistence};

use crate::repository::MemberRepository;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Member service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait MemberService: Send + Sync {
    /// Username of the member with `id`
    async fn find_username(&self, id: i32) -> AppResult<String>;

    /// One page of members as DTOs
    async fn list_members(&self, request: PageRequest) -> AppResult<Page<MemberDto>>;

    /// Insert `user0..user{count-1}` with age equal to the index
    async fn seed_members(&self, count: u32) -> AppResult<u32>;
}

/// Concrete implementation of MemberService over the member repository.
pub struct MemberManager {
    persistence: Persistence,
    members: Arc<MemberRepository>,
}

impl MemberManager {
    /// Create new member service instance
    pub fn new(persistence: Persistence, members: Arc<MemberRepository>) -> Self {
        Self { persistence, members }
    }
}

#[async_trait]
impl MemberService for MemberManager {
    async fn find_username(&self, id: i32) -> AppResult<String> {
        let mut em = self.persistence.begin().await?;
        let result = self
            .members
            .find_by_id(&mut em, id)
            .await
            .and_then(|member| member.ok_or_not_found())
            .map(|member| member.username);
        em.complete(result).await
    }

    async fn list_members(&self, request: PageRequest) -> AppResult<Page<MemberDto>> {
        let mut em = self.persistence.begin().await?;
        let result = self.members.find_all_paged(&mut em, &request).await;
        Ok(em.complete(result).await?.map(MemberDto::from))
    }

    async fn seed_members(&self, count: u32) -> AppResult<u32> {
        let members: Vec<Member> = (0..count)
            .map(|i| Member::new(seed_username(i), i as i32))
            .collect();

        let mut em = self.persistence.begin().await?;
        let result = self.members.save_all(&mut em, members).await;
        let saved = em.complete(result).await?;

        tracing::info!(count = saved.len(), "Seeded members");
        Ok(count)
    }
}
