//! Transaction boundaries and entity lifecycle of the unit of work.

mod support;

use common::AppError;
use domain::Member;
use persistence::{with_unit_of_work, CrudRepository};

use member_service_lib::repository::{entities::member, MemberRepository};

use support::{begin, seed_members, setup};

async fn member_count(persistence: &persistence::Persistence) -> u64 {
    let mut em = begin(persistence).await;
    let count = MemberRepository::new().count(&mut em).await.unwrap();
    em.commit().await.unwrap();
    count
}

#[tokio::test]
async fn test_transaction_commits_on_ok() {
    let persistence = setup().await;
    let repo = MemberRepository::new();

    let saved = persistence
        .transaction(move |em| Box::pin(async move { repo.save(em, Member::new("member1", 10)).await }))
        .await
        .unwrap();

    assert!(saved.id.is_some());
    assert_eq!(member_count(&persistence).await, 1);
}

#[tokio::test]
async fn test_transaction_rolls_back_on_err() {
    let persistence = setup().await;
    let repo = MemberRepository::new();

    let result: Result<Member, AppError> = persistence
        .transaction(move |em| {
            Box::pin(async move {
                repo.save(em, Member::new("member1", 10)).await?;
                Err(AppError::validation("rejected after save"))
            })
        })
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(member_count(&persistence).await, 0);
}

#[tokio::test]
async fn test_with_unit_of_work_macro_commits() {
    let persistence = setup().await;
    let repo = MemberRepository::new();

    let saved = with_unit_of_work!(persistence, |em| { repo.save(em, Member::new("member1", 10)).await }).unwrap();

    assert_eq!(saved.username, "member1");
    assert_eq!(member_count(&persistence).await, 1);
}

#[tokio::test]
async fn test_within_joins_active_unit_of_work() {
    let persistence = setup().await;
    let repo = MemberRepository::new();

    let mut em = begin(&persistence).await;
    let saved = em
        .within(move |em| Box::pin(async move { repo.save(em, Member::new("member1", 10)).await }))
        .await
        .unwrap();

    assert!(em.contains::<member::Entity>(&saved.id.unwrap()));
    em.rollback().await.unwrap();

    assert_eq!(member_count(&persistence).await, 0, "joined work rolls back with the outer unit");
}

#[tokio::test]
async fn test_rollback_discards_pending_changes() {
    let persistence = setup().await;
    let repo = MemberRepository::new();
    let saved = seed_members(&persistence, &[("member1", 10)]).await;
    let id = saved[0].id.unwrap();

    let mut em = begin(&persistence).await;
    let mut member = repo.find_by_id(&mut em, id).await.unwrap().unwrap();
    member.age = 99;
    repo.save(&mut em, member).await.unwrap();
    em.rollback().await.unwrap();

    let mut em = begin(&persistence).await;
    let member = repo.find_by_id(&mut em, id).await.unwrap().unwrap();
    assert_eq!(member.age, 10);
    em.commit().await.unwrap();
}

#[tokio::test]
async fn test_detached_member_changes_are_not_written() {
    let persistence = setup().await;
    let repo = MemberRepository::new();
    let saved = seed_members(&persistence, &[("member1", 10)]).await;
    let id = saved[0].id.unwrap();

    let mut em = begin(&persistence).await;
    let mut member = repo.find_by_id(&mut em, id).await.unwrap().unwrap();
    member.age = 99;
    repo.save(&mut em, member).await.unwrap();

    assert!(em.detach::<member::Entity>(&id).unwrap());
    assert!(!em.contains::<member::Entity>(&id));
    em.commit().await.unwrap();

    let mut em = begin(&persistence).await;
    let member = repo.find_by_id(&mut em, id).await.unwrap().unwrap();
    assert_eq!(member.age, 10);
    em.commit().await.unwrap();
}

#[tokio::test]
async fn test_persist_of_saved_member_is_precondition_failure() {
    let persistence = setup().await;
    let saved = seed_members(&persistence, &[("member1", 10)]).await;

    let mut em = begin(&persistence).await;
    let result = em.persist::<member::Entity>(saved[0].clone()).await;

    assert!(matches!(result, Err(AppError::Precondition(_))));
    em.rollback().await.unwrap();
}
