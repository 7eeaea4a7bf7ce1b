//! Generic repository contracts.
//!
//! A repository is a stateless handle: every method runs inside the unit
//! of work it is given, so several repositories can share one transaction.

use async_trait::async_trait;
use sea_orm::{EntityTrait, Select};

use common::{AppError, AppResult};

use crate::entity::Persistable;
use crate::entity_manager::EntityManager;
use crate::page::{apply_sort, Page, PageRequest, Sort};
use crate::query::CountQuery;
use crate::specification::Specification;

/// CRUD over one entity type.
///
/// Every method has a default implementation; implementors only name the
/// entity and add their own finders.
#[async_trait]
pub trait CrudRepository<E: Persistable>: Send + Sync {
    /// Insert a new entity, or merge a persisted one
    async fn save(&self, em: &mut EntityManager, entity: E::Domain) -> AppResult<E::Domain> {
        em.save::<E>(entity).await
    }

    async fn save_all(&self, em: &mut EntityManager, entities: Vec<E::Domain>) -> AppResult<Vec<E::Domain>> {
        let mut saved = Vec::with_capacity(entities.len());
        for entity in entities {
            saved.push(em.save::<E>(entity).await?);
        }
        Ok(saved)
    }

    async fn find_by_id(&self, em: &mut EntityManager, id: E::Id) -> AppResult<Option<E::Domain>> {
        em.find::<E>(id).await
    }

    /// Like `find_by_id`, but absence is `NotFound`
    async fn get_by_id(&self, em: &mut EntityManager, id: E::Id) -> AppResult<E::Domain> {
        em.find::<E>(id).await?.ok_or(AppError::NotFound)
    }

    async fn exists_by_id(&self, em: &mut EntityManager, id: E::Id) -> AppResult<bool> {
        Ok(em.find::<E>(id).await?.is_some())
    }

    async fn find_all(&self, em: &mut EntityManager) -> AppResult<Vec<E::Domain>> {
        em.select_list(E::find()).await
    }

    async fn find_all_sorted(&self, em: &mut EntityManager, sort: &Sort) -> AppResult<Vec<E::Domain>> {
        em.select_list(apply_sort(E::find(), sort)?).await
    }

    async fn find_all_paged(&self, em: &mut EntityManager, request: &PageRequest) -> AppResult<Page<E::Domain>> {
        em.select_page(E::find(), request, CountQuery::Derived).await
    }

    async fn count(&self, em: &mut EntityManager) -> AppResult<u64> {
        em.count(E::find()).await
    }

    async fn delete(&self, em: &mut EntityManager, entity: &E::Domain) -> AppResult<()> {
        em.remove::<E>(entity).await
    }

    async fn delete_by_id(&self, em: &mut EntityManager, id: E::Id) -> AppResult<()> {
        em.remove_by_id::<E>(id).await
    }
}

/// Finders driven by a composable `Specification`.
#[async_trait]
pub trait SpecificationExecutor<E: Persistable>: Send + Sync {
    async fn find_all_by(&self, em: &mut EntityManager, spec: &Specification<E>) -> AppResult<Vec<E::Domain>> {
        em.select_list(filtered(spec)).await
    }

    /// Zero or one match; more is `NonUniqueResult`
    async fn find_one_by(&self, em: &mut EntityManager, spec: &Specification<E>) -> AppResult<Option<E::Domain>> {
        em.select_nullable(filtered(spec)).await
    }

    async fn find_page_by(
        &self,
        em: &mut EntityManager,
        spec: &Specification<E>,
        request: &PageRequest,
    ) -> AppResult<Page<E::Domain>> {
        em.select_page(filtered(spec), request, CountQuery::Derived).await
    }

    async fn count_by(&self, em: &mut EntityManager, spec: &Specification<E>) -> AppResult<u64> {
        em.count(filtered(spec)).await
    }
}

fn filtered<E: Persistable>(spec: &Specification<E>) -> Select<E> {
    spec.apply(<E as EntityTrait>::find())
}
