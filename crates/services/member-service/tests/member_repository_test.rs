//! Integration tests for the member repository against in-memory SQLite.

mod support;

use common::AppError;
use domain::{Member, MemberDto, Team};
use persistence::{
    CrudRepository, DeclaredQuery, Direction, Modifying, PageRequest, Sort, SpecificationExecutor,
};

use member_service_lib::repository::{
    member_spec, CustomMemberRepository, MemberExample, MemberPath, MemberProjection, MemberRepository,
    NestedClosedProjection, TeamRepository, UsernameOnly, FIND_BY_USERNAME,
};

use support::{begin, seed_members, seed_team, setup};

fn usernames(members: &[Member]) -> Vec<&str> {
    members.iter().map(|m| m.username.as_str()).collect()
}

// =============================================================================
// CRUD
// =============================================================================

#[tokio::test]
async fn test_save_then_find_returns_equal_member() {
    let persistence = setup().await;
    let repo = MemberRepository::new();

    let mut em = begin(&persistence).await;
    let saved = repo.save(&mut em, Member::new("memberA", 10)).await.unwrap();
    let id = saved.id.expect("identifier assigned on save");

    let selects = em.statistics().selects;
    let found = repo.find_by_id(&mut em, id).await.unwrap();
    assert_eq!(found.as_ref(), Some(&saved));
    assert_eq!(em.statistics().selects, selects, "tracked instance needs no query");
    em.commit().await.unwrap();

    let mut em = begin(&persistence).await;
    let found = repo.find_by_id(&mut em, id).await.unwrap();
    assert_eq!(found, Some(saved));
    assert_eq!(em.statistics().selects, 1);
    em.commit().await.unwrap();
}

#[tokio::test]
async fn test_basic_crud() {
    let persistence = setup().await;
    let repo = MemberRepository::new();
    let saved = seed_members(&persistence, &[("member1", 10), ("member2", 20)]).await;

    let mut em = begin(&persistence).await;
    assert_eq!(repo.find_all(&mut em).await.unwrap().len(), 2);
    assert_eq!(repo.count(&mut em).await.unwrap(), 2);
    assert!(repo.exists_by_id(&mut em, saved[0].id.unwrap()).await.unwrap());

    repo.delete(&mut em, &saved[0]).await.unwrap();

    assert_eq!(repo.count(&mut em).await.unwrap(), 1);
    assert_eq!(repo.find_by_id(&mut em, saved[0].id.unwrap()).await.unwrap(), None);
    em.commit().await.unwrap();
}

#[tokio::test]
async fn test_delete_transient_member_is_precondition_failure() {
    let persistence = setup().await;
    let repo = MemberRepository::new();

    let mut em = begin(&persistence).await;
    let result = repo.delete(&mut em, &Member::new("member1", 10)).await;

    assert!(matches!(result, Err(AppError::Precondition(_))));
    em.rollback().await.unwrap();
}

#[tokio::test]
async fn test_delete_missing_member_is_not_found() {
    let persistence = setup().await;
    let repo = MemberRepository::new();

    let mut em = begin(&persistence).await;
    let result = repo.delete_by_id(&mut em, 999).await;

    assert!(matches!(result, Err(AppError::NotFound)));
    em.rollback().await.unwrap();
}

// =============================================================================
// Derived queries and result contracts
// =============================================================================

#[tokio::test]
async fn test_find_by_username_and_age_greater_than() {
    let persistence = setup().await;
    let repo = MemberRepository::new();
    seed_members(&persistence, &[("AAA", 10), ("AAA", 20)]).await;

    let mut em = begin(&persistence).await;
    let result = repo
        .find_by_username_and_age_greater_than(&mut em, "AAA", 15)
        .await
        .unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].username, "AAA");
    assert_eq!(result[0].age, 20);
    em.commit().await.unwrap();
}

#[tokio::test]
async fn test_absent_results_per_return_type() {
    let persistence = setup().await;
    let repo = MemberRepository::new();
    seed_members(&persistence, &[("AAA", 10)]).await;

    let mut em = begin(&persistence).await;

    let list = repo.find_list_by_username(&mut em, "nobody").await.unwrap();
    assert!(list.is_empty());

    let member = repo.find_member_by_username(&mut em, "nobody").await.unwrap();
    assert_eq!(member, None);

    let optional = repo.find_optional_by_username(&mut em, "nobody").await.unwrap();
    assert!(optional.is_empty());

    let present = repo.find_optional_by_username(&mut em, "AAA").await.unwrap();
    assert_eq!(present.get().map(|m| m.age), Some(10));
    em.commit().await.unwrap();
}

#[tokio::test]
async fn test_singular_finder_with_several_matches_fails() {
    let persistence = setup().await;
    let repo = MemberRepository::new();
    seed_members(&persistence, &[("AAA", 10), ("AAA", 20)]).await;

    let mut em = begin(&persistence).await;
    let result = repo.find_member_by_username(&mut em, "AAA").await;

    assert!(matches!(result, Err(AppError::NonUniqueResult { actual: 2 })));
    em.rollback().await.unwrap();
}

#[tokio::test]
async fn test_find_by_usernames_in() {
    let persistence = setup().await;
    let repo = MemberRepository::new();
    seed_members(&persistence, &[("AAA", 10), ("BBB", 20), ("CCC", 30)]).await;

    let mut em = begin(&persistence).await;
    let names = vec!["AAA".to_string(), "BBB".to_string()];
    let result = repo.find_by_usernames(&mut em, &names).await.unwrap();

    assert_eq!(result.len(), 2);
    assert!(result.iter().all(|m| names.contains(&m.username)));
    em.commit().await.unwrap();
}

// =============================================================================
// Declared, named and native queries
// =============================================================================

#[tokio::test]
async fn test_named_query() {
    let persistence = setup().await;
    let repo = MemberRepository::new();
    seed_members(&persistence, &[("AAA", 10), ("BBB", 20)]).await;

    let mut em = begin(&persistence).await;
    let result = repo.find_by_username(&mut em, "AAA").await.unwrap();

    assert_eq!(usernames(&result), vec!["AAA"]);
    em.commit().await.unwrap();
}

#[tokio::test]
async fn test_unknown_named_query_is_rejected() {
    let persistence = setup().await;

    let em = begin(&persistence).await;
    let result = em.named_query("Member.findByNickname");

    assert!(matches!(result, Err(AppError::InvalidQuery(_))));
    em.rollback().await.unwrap();
}

#[tokio::test]
async fn test_unknown_parameter_name_is_rejected() {
    let persistence = setup().await;

    let em = begin(&persistence).await;
    let result = em.named_query(FIND_BY_USERNAME).unwrap().bind("name", "AAA");

    assert!(matches!(result, Err(AppError::InvalidQuery(_))));
    em.rollback().await.unwrap();
}

#[tokio::test]
async fn test_declared_query_binds_by_name() {
    let persistence = setup().await;
    let repo = MemberRepository::new();
    seed_members(&persistence, &[("AAA", 10), ("AAA", 20)]).await;

    let mut em = begin(&persistence).await;
    let result = repo.find_user(&mut em, "AAA", 10).await.unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].age, 10);
    em.commit().await.unwrap();
}

#[tokio::test]
async fn test_find_username_list() {
    let persistence = setup().await;
    let repo = MemberRepository::new();
    seed_members(&persistence, &[("AAA", 10), ("BBB", 20)]).await;

    let mut em = begin(&persistence).await;
    let names = repo.find_username_list(&mut em).await.unwrap();

    assert_eq!(names, vec!["AAA".to_string(), "BBB".to_string()]);
    em.commit().await.unwrap();
}

#[tokio::test]
async fn test_find_member_dto_only_includes_members_with_team() {
    let persistence = setup().await;
    let repo = MemberRepository::new();
    let (_, members) = seed_team(&persistence, "teamA", &[("AAA", 10)]).await;
    seed_members(&persistence, &[("BBB", 20)]).await;

    let mut em = begin(&persistence).await;
    let dtos = repo.find_member_dto(&mut em).await.unwrap();

    assert_eq!(
        dtos,
        vec![MemberDto::new(members[0].id.unwrap(), "AAA", Some("teamA".to_string()))]
    );
    em.commit().await.unwrap();
}

#[tokio::test]
async fn test_find_by_names_expands_collection() {
    let persistence = setup().await;
    let repo = MemberRepository::new();
    seed_members(&persistence, &[("AAA", 10), ("BBB", 20), ("CCC", 30)]).await;

    let mut em = begin(&persistence).await;
    let result = repo
        .find_by_names(&mut em, &["AAA".to_string(), "CCC".to_string()])
        .await
        .unwrap();
    assert_eq!(usernames(&result), vec!["AAA", "CCC"]);

    let none = repo.find_by_names(&mut em, &[]).await.unwrap();
    assert!(none.is_empty());
    em.commit().await.unwrap();
}

#[tokio::test]
async fn test_native_query() {
    let persistence = setup().await;
    let repo = MemberRepository::new();
    seed_members(&persistence, &[("member1", 10)]).await;

    let mut em = begin(&persistence).await;
    let found = repo.find_by_native_query(&mut em, "member1").await.unwrap();
    assert_eq!(found.map(|m| m.age), Some(10));

    let missing = repo.find_by_native_query(&mut em, "nobody").await.unwrap();
    assert_eq!(missing, None);
    em.commit().await.unwrap();
}

#[tokio::test]
async fn test_native_projection_page() {
    let persistence = setup().await;
    let repo = MemberRepository::new();
    seed_team(&persistence, "teamA", &[("member1", 10), ("member2", 20)]).await;
    seed_members(&persistence, &[("member3", 30)]).await;

    let mut em = begin(&persistence).await;
    let sort = Sort::by(Direction::Desc, &["username"]);

    let page = repo
        .find_by_native_projection(&mut em, &PageRequest::of_sorted(0, 2, sort.clone()))
        .await
        .unwrap();
    let names: Vec<&str> = page.content.iter().map(|p| p.username.as_str()).collect();
    assert_eq!(names, vec!["member3", "member2"]);
    assert_eq!(page.content[0].team_name, None);
    assert_eq!(page.content[1].team_name.as_deref(), Some("teamA"));
    assert_eq!(page.total_elements, 3);
    assert_eq!(page.total_pages, 2);

    let last = repo
        .find_by_native_projection(&mut em, &PageRequest::of_sorted(1, 2, sort))
        .await
        .unwrap();
    assert_eq!(last.content.len(), 1);
    assert_eq!(last.content[0].username, "member1");
    assert_eq!(last.total_elements, 3);
    assert!(last.last);
    em.commit().await.unwrap();
}

#[tokio::test]
async fn test_native_page_rejects_unsafe_sort_property() {
    let persistence = setup().await;
    let repo = MemberRepository::new();

    let mut em = begin(&persistence).await;
    let request = PageRequest::of_sorted(0, 2, Sort::by(Direction::Asc, &["username; DROP TABLE member"]));
    let result = repo.find_by_native_projection(&mut em, &request).await;

    assert!(matches!(result, Err(AppError::InvalidQuery(_))));
    em.rollback().await.unwrap();
}

// =============================================================================
// Paging
// =============================================================================

#[tokio::test]
async fn test_paging_sorted_by_username_desc() {
    let persistence = setup().await;
    let repo = MemberRepository::new();
    seed_team(&persistence, "teamA", &[("memberA", 10), ("memberB", 20)]).await;

    let mut em = begin(&persistence).await;
    let request = PageRequest::of_sorted(0, 1, Sort::by(Direction::Desc, &["username"]));
    let page = repo.find_all_paged(&mut em, &request).await.unwrap();

    assert_eq!(usernames(&page.content), vec!["memberB"]);
    assert_eq!(page.total_elements, 2);
    assert_eq!(page.total_pages, 2);
    assert!(page.first);
    assert!(page.has_next);
    em.commit().await.unwrap();
}

#[tokio::test]
async fn test_find_by_age_with_separate_count() {
    let persistence = setup().await;
    let repo = MemberRepository::new();
    seed_members(
        &persistence,
        &[
            ("member1", 10),
            ("member2", 10),
            ("member3", 10),
            ("member4", 10),
            ("member5", 10),
            ("member6", 20),
        ],
    )
    .await;

    let mut em = begin(&persistence).await;
    let sort = Sort::by(Direction::Desc, &["username"]);

    let page = repo
        .find_by_age(&mut em, 10, &PageRequest::of_sorted(0, 3, sort.clone()))
        .await
        .unwrap();
    assert_eq!(usernames(&page.content), vec!["member5", "member4", "member3"]);
    assert_eq!(page.total_elements, 5);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.number, 0);
    assert!(page.first);
    assert!(page.has_next);
    assert_eq!(em.statistics().selects, 2, "content query plus count query");

    let next = repo
        .find_by_age(&mut em, 10, &PageRequest::of_sorted(1, 3, sort))
        .await
        .unwrap();
    assert_eq!(usernames(&next.content), vec!["member2", "member1"]);
    assert_eq!(next.total_elements, 5);
    assert!(next.last);
    assert_eq!(em.statistics().selects, 3, "partial last page needs no count");
    em.commit().await.unwrap();
}

#[tokio::test]
async fn test_page_limits_hold_for_every_page_size() {
    let persistence = setup().await;
    let repo = MemberRepository::new();
    let members: Vec<(String, i32)> = (0..7).map(|i| (format!("member{}", i), i)).collect();
    let members: Vec<(&str, i32)> = members.iter().map(|(name, age)| (name.as_str(), *age)).collect();
    seed_members(&persistence, &members).await;

    let mut em = begin(&persistence).await;
    for size in 1..=8u64 {
        let page = repo.find_all_paged(&mut em, &PageRequest::of(0, size)).await.unwrap();
        assert_eq!(page.total_pages, (7 + size - 1) / size);
        assert!(page.content.len() as u64 <= size);
        assert!(page.first);
    }
    em.commit().await.unwrap();
}

#[tokio::test]
async fn test_derived_page_orders_by_declared_key() {
    let persistence = setup().await;
    let repo = MemberRepository::new();
    seed_members(&persistence, &[("member1", 10), ("member2", 20), ("member3", 30)]).await;

    let mut em = begin(&persistence).await;
    let page = repo
        .find_page_by_age_greater_than(&mut em, 15, &PageRequest::of(0, 10))
        .await
        .unwrap();

    assert_eq!(usernames(&page.content), vec!["member3", "member2"]);
    assert_eq!(page.total_elements, 2);
    assert_eq!(em.statistics().selects, 1);
    em.commit().await.unwrap();
}

#[tokio::test]
async fn test_unknown_sort_property_is_rejected() {
    let persistence = setup().await;
    let repo = MemberRepository::new();

    let mut em = begin(&persistence).await;
    let request = PageRequest::of_sorted(0, 5, Sort::by(Direction::Asc, &["nickname"]));
    let result = repo.find_all_paged(&mut em, &request).await;

    assert!(matches!(result, Err(AppError::InvalidQuery(_))));
    em.rollback().await.unwrap();
}

// =============================================================================
// Bulk statements
// =============================================================================

#[tokio::test]
async fn test_bulk_age_plus() {
    let persistence = setup().await;
    let repo = MemberRepository::new();
    let saved = seed_members(
        &persistence,
        &[("member1", 10), ("member2", 19), ("member3", 20), ("member4", 21), ("member5", 40)],
    )
    .await;

    let mut em = begin(&persistence).await;
    repo.find_by_id(&mut em, saved[4].id.unwrap()).await.unwrap();

    let affected = repo.bulk_age_plus(&mut em, 20).await.unwrap();
    assert_eq!(affected, 3);
    assert_eq!(em.tracked_count(), 0, "bulk statement clears the unit of work");

    let member5 = repo.find_member_by_username(&mut em, "member5").await.unwrap().unwrap();
    assert_eq!(member5.age, 41);

    let ages: Vec<i32> = repo
        .find_all_sorted(&mut em, &Sort::by(Direction::Asc, &["id"]))
        .await
        .unwrap()
        .iter()
        .map(|m| m.age)
        .collect();
    assert_eq!(ages, vec![10, 19, 21, 22, 41]);
    em.commit().await.unwrap();
}

#[tokio::test]
async fn test_bulk_update_without_clear_leaves_tracked_state_stale() {
    let persistence = setup().await;
    let repo = MemberRepository::new();
    let saved = seed_members(&persistence, &[("member1", 40)]).await;
    let id = saved[0].id.unwrap();

    let mut em = begin(&persistence).await;
    repo.find_by_id(&mut em, id).await.unwrap();

    let statement = Modifying::new(
        DeclaredQuery::new("UPDATE member SET age = age + 1 WHERE age >= :age")
            .bind("age", 20)
            .unwrap(),
    );
    assert_eq!(em.execute_update(&statement).await.unwrap(), 1);

    let stale = repo.find_member_by_username(&mut em, "member1").await.unwrap().unwrap();
    assert_eq!(stale.age, 40, "tracked instance wins over the updated row");

    em.clear();
    let fresh = repo.find_by_id(&mut em, id).await.unwrap().unwrap();
    assert_eq!(fresh.age, 41);
    em.commit().await.unwrap();
}

// =============================================================================
// Dirty checking, merge and hints
// =============================================================================

#[tokio::test]
async fn test_changed_member_is_written_at_flush() {
    let persistence = setup().await;
    let repo = MemberRepository::new();
    let saved = seed_members(&persistence, &[("member1", 10)]).await;
    let id = saved[0].id.unwrap();

    let mut em = begin(&persistence).await;
    let mut member = repo.find_by_id(&mut em, id).await.unwrap().unwrap();
    assert_eq!(em.flush().await.unwrap(), 0, "unchanged entity is not written");

    member.age = 11;
    repo.save(&mut em, member).await.unwrap();
    assert_eq!(em.flush().await.unwrap(), 1);
    em.commit().await.unwrap();

    let mut em = begin(&persistence).await;
    let member = repo.find_by_id(&mut em, id).await.unwrap().unwrap();
    assert_eq!(member.age, 11);
    em.commit().await.unwrap();
}

#[tokio::test]
async fn test_merge_of_untracked_member_loads_it_first() {
    let persistence = setup().await;
    let repo = MemberRepository::new();
    let saved = seed_members(&persistence, &[("member1", 10)]).await;

    let mut detached = saved[0].clone();
    detached.age = 30;

    let mut em = begin(&persistence).await;
    repo.save(&mut em, detached).await.unwrap();
    let stats = em.statistics();
    assert_eq!(stats.selects, 1, "existence check");
    assert_eq!(stats.inserts, 0);
    em.commit().await.unwrap();

    let mut em = begin(&persistence).await;
    let member = repo.find_by_id(&mut em, saved[0].id.unwrap()).await.unwrap().unwrap();
    assert_eq!(member.age, 30);
    em.commit().await.unwrap();
}

#[tokio::test]
async fn test_read_only_member_changes_are_dropped() {
    let persistence = setup().await;
    let repo = MemberRepository::new();
    let saved = seed_members(&persistence, &[("member1", 10)]).await;

    let mut em = begin(&persistence).await;
    let mut member = repo
        .find_read_only_by_username(&mut em, "member1")
        .await
        .unwrap()
        .unwrap();
    member.username = "member2".to_string();
    repo.save(&mut em, member).await.unwrap();
    assert_eq!(em.flush().await.unwrap(), 0);
    em.commit().await.unwrap();

    let mut em = begin(&persistence).await;
    let member = repo.find_by_id(&mut em, saved[0].id.unwrap()).await.unwrap().unwrap();
    assert_eq!(member.username, "member1");
    em.commit().await.unwrap();
}

#[tokio::test]
async fn test_read_only_hint_ignored_for_already_tracked_member() {
    let persistence = setup().await;
    let repo = MemberRepository::new();
    let saved = seed_members(&persistence, &[("member1", 10)]).await;
    let id = saved[0].id.unwrap();

    let mut em = begin(&persistence).await;
    repo.find_by_id(&mut em, id).await.unwrap();
    let mut member = repo
        .find_read_only_by_username(&mut em, "member1")
        .await
        .unwrap()
        .unwrap();
    member.username = "member2".to_string();
    repo.save(&mut em, member).await.unwrap();
    em.commit().await.unwrap();

    let mut em = begin(&persistence).await;
    let member = repo.find_by_id(&mut em, id).await.unwrap().unwrap();
    assert_eq!(member.username, "member2");
    em.commit().await.unwrap();
}

#[tokio::test]
async fn test_lock_by_username() {
    let persistence = setup().await;
    let repo = MemberRepository::new();
    seed_members(&persistence, &[("member1", 10)]).await;

    let mut em = begin(&persistence).await;
    let locked = repo.find_lock_by_username(&mut em, "member1").await.unwrap();

    assert_eq!(usernames(&locked), vec!["member1"]);
    em.commit().await.unwrap();
}

// =============================================================================
// Fetch joins and lazy loading
// =============================================================================

#[tokio::test]
async fn test_lazy_loading_issues_one_select_per_team() {
    let persistence = setup().await;
    let repo = MemberRepository::new();
    let teams = TeamRepository::new();
    seed_team(&persistence, "teamA", &[("member1", 10), ("member2", 20)]).await;
    seed_team(&persistence, "teamB", &[("member3", 30)]).await;

    let mut em = begin(&persistence).await;
    let members = repo
        .find_all_sorted(&mut em, &Sort::by(Direction::Asc, &["id"]))
        .await
        .unwrap();
    let mut names = Vec::new();
    for member in &members {
        let team = teams.find_by_id(&mut em, member.team_id.unwrap()).await.unwrap().unwrap();
        names.push(team.name);
    }

    assert_eq!(names, vec!["teamA", "teamA", "teamB"]);
    assert_eq!(em.statistics().selects, 3, "members, then each distinct team");
    em.commit().await.unwrap();
}

#[tokio::test]
async fn test_fetch_join_loads_teams_in_one_select() {
    let persistence = setup().await;
    let repo = MemberRepository::new();
    seed_team(&persistence, "teamA", &[("member1", 10), ("member2", 20)]).await;
    seed_team(&persistence, "teamB", &[("member3", 30)]).await;

    let mut em = begin(&persistence).await;
    let rows = repo.find_member_fetch_join(&mut em).await.unwrap();

    let names: Vec<(&str, Option<&str>)> = rows
        .iter()
        .map(|(member, team)| (member.username.as_str(), team.as_ref().map(|t| t.name.as_str())))
        .collect();
    assert_eq!(
        names,
        vec![
            ("member1", Some("teamA")),
            ("member2", Some("teamA")),
            ("member3", Some("teamB")),
        ]
    );
    assert_eq!(em.statistics().selects, 1);

    let by_name = repo.find_with_team_by_username(&mut em, "member3").await.unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].1.as_ref().map(|t| t.name.as_str()), Some("teamB"));
    em.commit().await.unwrap();
}

// =============================================================================
// Projections, specifications and custom queries
// =============================================================================

#[tokio::test]
async fn test_projections() {
    let persistence = setup().await;
    let repo = MemberRepository::new();
    let (_, members) = seed_team(&persistence, "teamA", &[("member1", 10)]).await;
    seed_members(&persistence, &[("member2", 20)]).await;

    let mut em = begin(&persistence).await;

    let names: Vec<UsernameOnly> = repo.find_projections_by_username(&mut em, "member1").await.unwrap();
    assert_eq!(
        names,
        vec![UsernameOnly {
            username: "member1".to_string()
        }]
    );

    let rows: Vec<MemberProjection> = repo.find_projections_by_username(&mut em, "member1").await.unwrap();
    assert_eq!(rows[0].id, members[0].id.unwrap());
    assert_eq!(rows[0].team_name.as_deref(), Some("teamA"));

    let nested: Vec<NestedClosedProjection> = repo.find_projections_by_username(&mut em, "member2").await.unwrap();
    assert_eq!(nested[0].username, "member2");
    assert_eq!(nested[0].team_name, None);

    assert_eq!(em.tracked_count(), 0, "projections are not tracked");
    em.commit().await.unwrap();
}

#[tokio::test]
async fn test_specifications() {
    let persistence = setup().await;
    let repo = MemberRepository::new();
    seed_team(&persistence, "teamA", &[("m1", 10), ("m2", 20)]).await;
    seed_team(&persistence, "teamB", &[("m3", 30)]).await;

    let mut em = begin(&persistence).await;

    let spec = member_spec::username(Some("m1")).and(member_spec::team_name(Some("teamA")));
    let result = repo.find_all_by(&mut em, &spec).await.unwrap();
    assert_eq!(usernames(&result), vec!["m1"]);

    let spec = member_spec::username(Some("m1")).and(member_spec::team_name(Some("teamB")));
    assert!(repo.find_all_by(&mut em, &spec).await.unwrap().is_empty());

    let everything = member_spec::username(None).and(member_spec::team_name(Some("  ")));
    assert!(everything.is_empty());
    assert_eq!(repo.find_all_by(&mut em, &everything).await.unwrap().len(), 3);

    assert_eq!(
        repo.count_by(&mut em, &member_spec::team_name(Some("teamA"))).await.unwrap(),
        2
    );

    let m3 = repo
        .find_one_by(&mut em, &member_spec::username(Some("m3")))
        .await
        .unwrap();
    assert_eq!(m3.map(|m| m.age), Some(30));
    em.commit().await.unwrap();
}

#[tokio::test]
async fn test_query_by_example_with_team() {
    let persistence = setup().await;
    let repo = MemberRepository::new();
    seed_team(&persistence, "teamA", &[("member", 0), ("member2", 0)]).await;
    seed_team(&persistence, "teamB", &[("member", 5)]).await;

    let mut em = begin(&persistence).await;

    let example = MemberExample::of(Member::new("member", 30))
        .with_team(&Team::new("teamA"))
        .ignoring(MemberPath::Age);
    let result = repo.find_all_by_example(&mut em, &example).await.unwrap();
    assert_eq!(usernames(&result), vec!["member"]);
    assert_eq!(result[0].age, 0);

    let any_team = MemberExample::of(Member::new("member", 0)).ignoring(MemberPath::Age);
    assert_eq!(repo.find_all_by_example(&mut em, &any_team).await.unwrap().len(), 2);

    let with_age = MemberExample::of(Member::new("member", 5));
    let result = repo.find_all_by_example(&mut em, &with_age).await.unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].age, 5);

    let other_team = MemberExample::of(Member::new("member2", 0)).with_team(&Team::new("teamB"));
    assert!(repo.find_all_by_example(&mut em, &other_team).await.unwrap().is_empty());
    em.commit().await.unwrap();
}

#[tokio::test]
async fn test_custom_repository() {
    let persistence = setup().await;
    let repo = MemberRepository::new();
    seed_members(&persistence, &[("member1", 10), ("member2", 20)]).await;

    let mut em = begin(&persistence).await;
    let result = repo.find_member_custom(&mut em).await.unwrap();

    assert_eq!(usernames(&result), vec!["member1", "member2"]);
    em.commit().await.unwrap();
}
