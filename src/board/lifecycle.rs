//! Job posting status lifecycle.
//!
//! Four statuses: Draft, Active, Closed, Expired. Draft→Active via publish,
//! Active↔Closed via the manual toggle, Active→Expired automatically once
//! the application deadline passes. The expiry check runs before any read
//! or toggle is evaluated; while Expired, toggles and edits are rejected.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Draft,
    Active,
    Closed,
    Expired,
}

impl JobStatus {
    pub fn as_int(self) -> i32 {
        match self {
            JobStatus::Draft => 0,
            JobStatus::Active => 1,
            JobStatus::Closed => 2,
            JobStatus::Expired => 3,
        }
    }

    pub fn from_int(value: i32) -> Option<Self> {
        match value {
            0 => Some(JobStatus::Draft),
            1 => Some(JobStatus::Active),
            2 => Some(JobStatus::Closed),
            3 => Some(JobStatus::Expired),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Draft => "draft",
            JobStatus::Active => "active",
            JobStatus::Closed => "closed",
            JobStatus::Expired => "expired",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(JobStatus::Draft),
            "active" => Some(JobStatus::Active),
            "closed" => Some(JobStatus::Closed),
            "expired" => Some(JobStatus::Expired),
            _ => None,
        }
    }

    /// The status the job should hold at `now`: Active postings whose
    /// deadline has passed are Expired, everything else is unchanged.
    pub fn effective(self, deadline: Option<i64>, now: i64) -> JobStatus {
        if self == JobStatus::Active {
            if let Some(deadline) = deadline {
                if deadline < now {
                    return JobStatus::Expired;
                }
            }
        }
        self
    }

    /// Whether an Active job with this deadline is overdue at `now`.
    pub fn has_expired(self, deadline: Option<i64>, now: i64) -> bool {
        self.effective(deadline, now) == JobStatus::Expired && self != JobStatus::Expired
    }
}
