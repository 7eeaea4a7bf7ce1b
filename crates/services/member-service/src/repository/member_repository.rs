//! Member repository: CRUD plus every query style the data-access layer
//! supports (derived, declared, named, native, projections, specifications,
//! query by example, fetch joins, locking and read-only hints).

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{ColumnTrait, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait};

use common::AppResult;
use domain::{Member, MemberDto, Team};
use persistence::{
    Arg, CountQuery, CrudRepository, DeclaredQuery, Direction, EntityManager, LockMode, Modifying,
    NamedQueries, NativeQuery, Operator, Optional, Page, PageRequest, Projection, QuerySpec,
    SpecificationExecutor,
};

use super::custom_member_repository::{CustomMemberRepository, CustomMemberRepositoryImpl};
use super::entities::{member, team};
use super::member_example::MemberExample;
use super::projections::MemberProjection;

/// Name of the registered username lookup
pub const FIND_BY_USERNAME: &str = "Member.findByUsername";

/// Named queries owned by the member repository
pub fn named_queries() -> NamedQueries {
    NamedQueries::new().register(
        FIND_BY_USERNAME,
        "SELECT * FROM member m WHERE m.username = :username",
    )
}

const MEMBER_PROJECTION_SQL: &str = "SELECT m.member_id AS id, m.username AS username, t.name AS team_name \
     FROM member m LEFT JOIN team t ON m.team_id = t.team_id";

type Members = member::Entity;

/// Member data access.
///
/// Stateless: every method runs in the unit of work it is given.
#[derive(Clone)]
pub struct MemberRepository {
    custom: Arc<dyn CustomMemberRepository>,
}

impl MemberRepository {
    /// Create new repository instance with the default custom queries
    pub fn new() -> Self {
        Self::with_custom(Arc::new(CustomMemberRepositoryImpl))
    }

    pub fn with_custom(custom: Arc<dyn CustomMemberRepository>) -> Self {
        Self { custom }
    }

    // =========================================================================
    // Derived queries
    // =========================================================================

    pub async fn find_by_username_and_age_greater_than(
        &self,
        em: &mut EntityManager,
        username: &str,
        age: i32,
    ) -> AppResult<Vec<Member>> {
        let spec = QuerySpec::<Members>::find_by(member::Column::Username, Operator::Equals)
            .and(member::Column::Age, Operator::GreaterThan);
        em.find_list(&spec, &[Arg::value(username), Arg::value(age)]).await
    }

    /// Every member with `username`; empty when none match
    pub async fn find_list_by_username(&self, em: &mut EntityManager, username: &str) -> AppResult<Vec<Member>> {
        em.find_list(&by_username(), &[Arg::value(username)]).await
    }

    /// The member with `username`, `None` when absent
    pub async fn find_member_by_username(&self, em: &mut EntityManager, username: &str) -> AppResult<Option<Member>> {
        em.find_nullable(&by_username(), &[Arg::value(username)]).await
    }

    /// The member with `username`, `Optional::Empty` when absent
    pub async fn find_optional_by_username(
        &self,
        em: &mut EntityManager,
        username: &str,
    ) -> AppResult<Optional<Member>> {
        em.find_optional(&by_username(), &[Arg::value(username)]).await
    }

    /// Members older than `age`, oldest first, one page at a time
    pub async fn find_page_by_age_greater_than(
        &self,
        em: &mut EntityManager,
        age: i32,
        request: &PageRequest,
    ) -> AppResult<Page<Member>> {
        let spec = QuerySpec::<Members>::find_by(member::Column::Age, Operator::GreaterThan)
            .order_by(member::Column::Age, Direction::Desc);
        em.find_page(&spec, &[Arg::value(age)], request, CountQuery::Derived)
            .await
    }

    /// Members of exactly `age`.
    ///
    /// The content query joins the team; the count query does not.
    pub async fn find_by_age(&self, em: &mut EntityManager, age: i32, request: &PageRequest) -> AppResult<Page<Member>> {
        let select = Members::find()
            .join(JoinType::LeftJoin, member::Relation::Team.def())
            .filter(member::Column::Age.eq(age));
        let count = Members::find().filter(member::Column::Age.eq(age));

        em.select_page(select, request, CountQuery::Select(count)).await
    }

    /// Members whose username is one of `names`
    pub async fn find_by_usernames(&self, em: &mut EntityManager, names: &[String]) -> AppResult<Vec<Member>> {
        let spec = QuerySpec::<Members>::find_by(member::Column::Username, Operator::In);
        em.find_list(&spec, &[Arg::list(names.iter().cloned())]).await
    }

    // =========================================================================
    // Declared and named queries
    // =========================================================================

    /// Named query `Member.findByUsername`
    pub async fn find_by_username(&self, em: &mut EntityManager, username: &str) -> AppResult<Vec<Member>> {
        let query = em.named_query(FIND_BY_USERNAME)?.bind("username", username)?;
        em.query_list::<Members, _>(&query).await
    }

    pub async fn find_user(&self, em: &mut EntityManager, username: &str, age: i32) -> AppResult<Vec<Member>> {
        let query = DeclaredQuery::new("SELECT * FROM member m WHERE m.username = :username AND m.age = :age")
            .bind("age", age)?
            .bind("username", username)?;
        em.query_list::<Members, _>(&query).await
    }

    pub async fn find_username_list(&self, em: &mut EntityManager) -> AppResult<Vec<String>> {
        let query = DeclaredQuery::new("SELECT m.username FROM member m ORDER BY m.member_id");
        em.query_scalars::<String, _>(&query).await
    }

    /// Members that belong to a team, with the team's name
    pub async fn find_member_dto(&self, em: &mut EntityManager) -> AppResult<Vec<MemberDto>> {
        let query = DeclaredQuery::new(
            "SELECT m.member_id AS id, m.username AS username, t.name AS team_name \
             FROM member m JOIN team t ON m.team_id = t.team_id ORDER BY m.member_id",
        );
        let rows = em.query_projection::<MemberProjection, _>(&query).await?;
        Ok(rows.into_iter().map(MemberDto::from).collect())
    }

    /// Collection parameter expanded inline
    pub async fn find_by_names(&self, em: &mut EntityManager, names: &[String]) -> AppResult<Vec<Member>> {
        let query = DeclaredQuery::new("SELECT * FROM member m WHERE m.username IN :names ORDER BY m.member_id")
            .bind_list("names", names.iter().cloned())?;
        em.query_list::<Members, _>(&query).await
    }

    /// Add one to the age of every member at least `age` years old.
    ///
    /// Clears the unit of work afterwards so later reads see the new ages.
    pub async fn bulk_age_plus(&self, em: &mut EntityManager, age: i32) -> AppResult<u64> {
        let statement = Modifying::new(
            DeclaredQuery::new("UPDATE member SET age = age + 1 WHERE age >= :age").bind("age", age)?,
        )
        .clear_automatically();
        em.execute_update(&statement).await
    }

    // =========================================================================
    // Fetch joins
    // =========================================================================

    /// Members with their team, in one SELECT
    pub async fn find_member_fetch_join(&self, em: &mut EntityManager) -> AppResult<Vec<(Member, Option<Team>)>> {
        let select = Members::find()
            .find_also_related(team::Entity)
            .order_by_asc(member::Column::Id);
        em.fetch_join(select).await
    }

    /// Members with `username` and their team, in one SELECT
    pub async fn find_with_team_by_username(
        &self,
        em: &mut EntityManager,
        username: &str,
    ) -> AppResult<Vec<(Member, Option<Team>)>> {
        let select = Members::find()
            .find_also_related(team::Entity)
            .filter(member::Column::Username.eq(username))
            .order_by_asc(member::Column::Id);
        em.fetch_join(select).await
    }

    // =========================================================================
    // Hints and locks
    // =========================================================================

    /// Loaded without a snapshot: later changes are never written back
    pub async fn find_read_only_by_username(
        &self,
        em: &mut EntityManager,
        username: &str,
    ) -> AppResult<Option<Member>> {
        em.find_nullable(&by_username().read_only(), &[Arg::value(username)])
            .await
    }

    /// `SELECT ... FOR UPDATE`, held until the unit of work ends
    pub async fn find_lock_by_username(&self, em: &mut EntityManager, username: &str) -> AppResult<Vec<Member>> {
        em.find_list(&by_username().lock(LockMode::PessimisticWrite), &[Arg::value(username)])
            .await
    }

    // =========================================================================
    // Projections and native queries
    // =========================================================================

    /// Members with `username` read into projection `P`
    pub async fn find_projections_by_username<P>(&self, em: &mut EntityManager, username: &str) -> AppResult<Vec<P>>
    where
        P: Projection<Members>,
    {
        let select = Members::find()
            .filter(member::Column::Username.eq(username))
            .order_by_asc(member::Column::Id);
        em.project::<Members, P>(select).await
    }

    pub async fn find_by_native_query(&self, em: &mut EntityManager, username: &str) -> AppResult<Option<Member>> {
        let query = NativeQuery::new("SELECT * FROM member WHERE username = ?").bind(username);
        em.query_nullable::<Members, _>(&query).await
    }

    /// Native projection page with its own native count query
    pub async fn find_by_native_projection(
        &self,
        em: &mut EntityManager,
        request: &PageRequest,
    ) -> AppResult<Page<MemberProjection>> {
        let query = NativeQuery::new(MEMBER_PROJECTION_SQL);
        let count = NativeQuery::new("SELECT COUNT(*) FROM member");
        em.native_page::<MemberProjection>(&query, &count, request).await
    }

    /// Members matching every non-ignored property of the example's sample
    pub async fn find_all_by_example(&self, em: &mut EntityManager, example: &MemberExample) -> AppResult<Vec<Member>> {
        let select = example
            .to_specification()
            .apply(member::Entity::find())
            .order_by_asc(member::Column::Id);
        em.select_list(select).await
    }
}

impl Default for MemberRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn by_username() -> QuerySpec<Members> {
    QuerySpec::find_by(member::Column::Username, Operator::Equals)
}

impl CrudRepository<Members> for MemberRepository {}

impl SpecificationExecutor<Members> for MemberRepository {}

#[async_trait]
impl CustomMemberRepository for MemberRepository {
    async fn find_member_custom(&self, em: &mut EntityManager) -> AppResult<Vec<Member>> {
        self.custom.find_member_custom(em).await
    }
}
