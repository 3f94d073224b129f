//! Route and limit constants

/// Prefix for versioned API routes.
pub const API_PREFIX: &str = "/api/v0";

/// Request bodies are tiny JSON documents.
pub const MAX_BODY_BYTES: usize = 16 * 1024;

/// Timeout for each dependency check in `/health`.
pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;
