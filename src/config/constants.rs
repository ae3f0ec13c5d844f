//! Application-wide constants
//!
//! Centralized location for magic values: table names, pagination defaults,
//! wire-format details of the hosted stores.

// =============================================================================
// Pagination
// =============================================================================

/// Default number of rows per page (`entriesPerPage`)
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Maximum allowed rows per page
pub const MAX_PAGE_SIZE: u64 = 100;

/// Default starting page number (1-indexed, `currentPage`)
pub const DEFAULT_PAGE_NUMBER: u64 = 1;

/// Page size used when walking the identity store's user listing
pub const IDENTITY_PAGE_SIZE: u32 = 100;

// =============================================================================
// Authentication & Security
// =============================================================================

/// Authorization header prefix for Bearer tokens
pub const BEARER_TOKEN_PREFIX: &str = "Bearer ";

/// Audience claim carried by identity-store access tokens
pub const TOKEN_AUDIENCE: &str = "authenticated";

/// Display name returned for admin accounts (no profile row)
pub const ADMIN_DISPLAY_NAME: &str = "Admin";

/// Message returned when an email is already bound to a profile
pub const ALREADY_REGISTERED_MESSAGE: &str =
    "A user with this email address has already been registered.";

/// Seeded accounts that the orphan sweep never deletes
pub const DEFAULT_PROTECTED_EMAILS: &[&str] = &[
    "admin@petvac.com",
    "personnel@petvac.com",
    "petowner@petvac.com",
];

// =============================================================================
// Server Configuration
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Default timeout for outbound store requests
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

// =============================================================================
// Store wire format
// =============================================================================

/// Path prefix of the relational store REST surface
pub const REST_PATH: &str = "rest/v1";

/// Path prefix of the identity store REST surface
pub const AUTH_PATH: &str = "auth/v1";

/// Error code returned when a requested range lies past the last row
pub const RANGE_NOT_SATISFIABLE_CODE: &str = "PGRST103";

/// RPC returning per-owner pet counts
pub const RPC_PET_COUNTS: &str = "get_pet_counts";
