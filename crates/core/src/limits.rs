//! Size limits and policy defaults for the gateway.
//!
//! The `#[validate]` derive macro requires literal values in attributes,
//! so the lead field limits are duplicated there. Keep both in sync when modifying.

// === Lead Field Limits (chars) ===

/// Minimum lead name length.
pub const MIN_NAME_LEN: u64 = 2;

/// Maximum lead name length.
pub const MAX_NAME_LEN: u64 = 200;

/// Maximum email address length.
pub const MAX_EMAIL_LEN: u64 = 300;

/// Maximum free-text message length.
pub const MAX_MESSAGE_LEN: u64 = 5000;

/// Source tags longer than this are truncated, not rejected.
pub const MAX_SOURCE_LEN: usize = 120;

// === Anti-spam ===

/// Minimum time between form render and submission (milliseconds).
pub const DEFAULT_MIN_FORM_AGE_MS: u64 = 800;

// === Rate Limiting ===

/// Lead submission window (10 minutes).
pub const DEFAULT_RATE_LIMIT_WINDOW_MS: u64 = 600_000;

/// Lead submissions allowed per client inside one window.
pub const DEFAULT_RATE_LIMIT_MAX: usize = 10;

/// How often empty buckets are swept out of memory.
pub const DEFAULT_RATE_LIMIT_SWEEP_SECS: u64 = 60;

/// Bucket shared by every client whose address cannot be resolved.
pub const UNKNOWN_CLIENT: &str = "unknown";

// === Request Bodies ===

/// Maximum JSON body accepted on any route (2MB).
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;
