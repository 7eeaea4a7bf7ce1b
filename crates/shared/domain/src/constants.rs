//! Domain-level constants.
//!
//! These constants define paging defaults and the seed data layout.

// =============================================================================
// Paging
// =============================================================================

/// First page index (pages are zero-based)
pub const DEFAULT_PAGE_NUMBER: u64 = 0;

/// Default page size when a caller does not specify one
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Default page size of the member listing endpoint
pub const DEFAULT_MEMBER_PAGE_SIZE: u64 = 5;

/// Upper bound for any requested page size
pub const MAX_PAGE_SIZE: u64 = 100;

// =============================================================================
// Seed data
// =============================================================================

/// Number of members created by the startup seeding hook
pub const DEFAULT_SEED_COUNT: u32 = 100;

/// Username prefix of seeded members (`user0`, `user1`, ...)
pub const SEED_USERNAME_PREFIX: &str = "user";

/// Username of seeded member `index`
pub fn seed_username(index: u32) -> String {
    format!("{}{}", SEED_USERNAME_PREFIX, index)
}
