//! Shared constants for the e2e suites

/// Pre-provisioned candidate account
pub const TEST_CANDIDATE: &str = "candidate1";
pub const CANDIDATE_PASS: &str = "candidate-pass-123";

/// Pre-provisioned employer account
pub const TEST_EMPLOYER: &str = "employer1";
pub const EMPLOYER_PASS: &str = "employer-pass-123";

/// Pre-provisioned admin account
pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASS: &str = "admin-pass-123";

pub const REQUEST_TIMEOUT_SECS: u64 = 10;
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 25;
