//! Shared constants for end-to-end tests
//!
//! When seeded test data changes, update only this file.

// ============================================================================
// Server
// ============================================================================

/// How long to wait for a spawned server to answer on `/`
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Delay between readiness polls
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;

/// Per-request timeout for the test client
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Upload limit configured on test servers
pub const TEST_MAX_UPLOAD_SIZE_MB: usize = 1;

// ============================================================================
// Royalty Reports
// ============================================================================

pub const REPORT_MONTH: &str = "2024-03";

/// Reporting date derived from [`REPORT_MONTH`]
pub const REPORT_DATE: &str = "2024-03-15";

pub const GANNA_HEADER: &[&str] = &["isrc", "song_name", "artist", "label", "total", "royality"];

pub const FACEBOOK_HEADER: &[&str] = &[
    "isrc",
    "song_name",
    "track_artist",
    "Sub_Label",
    "total",
    "royality",
    "country",
    "product",
];

pub const TIKTOK_HEADER: &[&str] = &[
    "isrc",
    "song_name",
    "artist",
    "label",
    "total",
    "royality",
    "territory",
    "content_type",
];

// ============================================================================
// Analytics Seed
// ============================================================================

/// Verified normal label in Goa
pub const LABEL_GOA_NORMAL: &str = "label-goa-normal";

/// Unverified super label in Goa
pub const LABEL_GOA_SUPER: &str = "label-goa-super";

/// Verified normal label in Kerala
pub const LABEL_KERALA_NORMAL: &str = "label-kerala-normal";

/// Label with no state
pub const LABEL_NO_STATE: &str = "label-no-state";

pub const SEEDED_LABELS: usize = 4;
pub const SEEDED_VERIFIED_LABELS: usize = 2;

/// Subscriptions seeded, including one whose label does not exist
pub const SEEDED_SUBSCRIPTIONS: usize = 6;
pub const SEEDED_ACTIVE_SUBSCRIPTIONS: usize = 4;

pub const PLAN_BASIC: &str = "Basic";
pub const PLAN_PRO: &str = "Pro";

// ============================================================================
// Support Seed
// ============================================================================

/// Public id of the pending ticket with replies
pub const TICKET_WITH_REPLIES: &str = "TCK-1001";

/// Public id of the resolved ticket without replies
pub const TICKET_RESOLVED: &str = "TCK-1002";

/// Public id of the in-progress ticket
pub const TICKET_IN_PROGRESS: &str = "TCK-1003";
