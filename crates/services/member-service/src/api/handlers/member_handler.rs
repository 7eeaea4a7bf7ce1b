//! Member handlers.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use common::AppResult;
use domain::{MemberDto, DEFAULT_MEMBER_PAGE_SIZE, DEFAULT_PAGE_NUMBER};
use persistence::{Page, PageRequest, Sort};

use crate::api::extractors::ValidatedQuery;
use crate::api::AppState;

/// Paging parameters of the member listing
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Zero-based page number
    #[param(example = 0)]
    pub page: Option<u64>,
    /// Page size (1..=100, default 5)
    #[validate(range(min = 1, max = 100, message = "Page size must be between 1 and 100"))]
    #[param(example = 5)]
    pub size: Option<u64>,
    /// Sort keys with an optional trailing direction
    #[param(example = "username,desc")]
    pub sort: Option<String>,
}

impl PageParams {
    pub fn to_request(&self) -> AppResult<PageRequest> {
        let sort = match self.sort.as_deref() {
            Some(sort) => Sort::parse(sort)?,
            None => Sort::unsorted(),
        };

        Ok(PageRequest::of_sorted(
            self.page.unwrap_or(DEFAULT_PAGE_NUMBER),
            self.size.unwrap_or(DEFAULT_MEMBER_PAGE_SIZE),
            sort,
        ))
    }
}

/// Shape of a member page, for the API documentation
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberPage {
    pub content: Vec<MemberDto>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub number: u64,
    pub size: u64,
    pub first: bool,
    pub last: bool,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Create member routes
pub fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_members))
        .route("/:id", get(find_member))
}

/// Get a member's username
#[utoipa::path(
    get,
    path = "/members/{id}",
    tag = "Members",
    params(
        ("id" = i32, Path, description = "Member ID")
    ),
    responses(
        (status = 200, description = "Username of the member", body = String, content_type = "text/plain"),
        (status = 404, description = "Member not found")
    )
)]
pub async fn find_member(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<String> {
    state.member_service.find_username(id).await
}

/// List members one page at a time
#[utoipa::path(
    get,
    path = "/members",
    tag = "Members",
    params(PageParams),
    responses(
        (status = 200, description = "Page of members", body = MemberPage),
        (status = 400, description = "Invalid paging or sort parameters")
    )
)]
pub async fn list_members(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<PageParams>,
) -> AppResult<Json<Page<MemberDto>>> {
    let request = params.to_request()?;
    let page = state.member_service.list_members(request).await?;
    Ok(Json(page))
}
