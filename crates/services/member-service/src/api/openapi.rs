//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::OpenApi;

use crate::api::handlers::member_handler;
use domain::MemberDto;

/// OpenAPI documentation for the member service
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Member Service",
        version = "0.1.0",
        description = "Paginated member listings over a generic data-access layer"
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(
        member_handler::find_member,
        member_handler::list_members,
    ),
    components(
        schemas(
            MemberDto,
            member_handler::MemberPage,
        )
    ),
    tags(
        (name = "Members", description = "Member lookups and listings")
    )
)]
pub struct ApiDoc;
