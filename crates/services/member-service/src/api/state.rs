//! Application state shared by all handlers.

use std::sync::Arc;

use persistence::Persistence;

use crate::service::MemberService;

/// Application state containing services and the unit-of-work factory.
#[derive(Clone)]
pub struct AppState {
    /// Member service
    pub member_service: Arc<dyn MemberService>,
    /// Unit-of-work factory, also used for health checks
    pub persistence: Persistence,
}

impl AppState {
    /// Create new application state with injected services.
    pub fn new(member_service: Arc<dyn MemberService>, persistence: Persistence) -> Self {
        Self {
            member_service,
            persistence,
        }
    }
}
