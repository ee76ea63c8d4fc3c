use serde::{Deserialize, Serialize};

use crate::user::CandidateProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Submitted,
    InReview,
    Shortlisted,
    Rejected,
    Hired,
    Withdrawn,
}

impl ApplicationStatus {
    pub fn as_int(self) -> i32 {
        match self {
            ApplicationStatus::Submitted => 0,
            ApplicationStatus::InReview => 1,
            ApplicationStatus::Shortlisted => 2,
            ApplicationStatus::Rejected => 3,
            ApplicationStatus::Hired => 4,
            ApplicationStatus::Withdrawn => 5,
        }
    }

    pub fn from_int(value: i32) -> Option<Self> {
        match value {
            0 => Some(ApplicationStatus::Submitted),
            1 => Some(ApplicationStatus::InReview),
            2 => Some(ApplicationStatus::Shortlisted),
            3 => Some(ApplicationStatus::Rejected),
            4 => Some(ApplicationStatus::Hired),
            5 => Some(ApplicationStatus::Withdrawn),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::InReview => "in_review",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Hired => "hired",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "submitted" => Some(ApplicationStatus::Submitted),
            "in_review" => Some(ApplicationStatus::InReview),
            "shortlisted" => Some(ApplicationStatus::Shortlisted),
            "rejected" => Some(ApplicationStatus::Rejected),
            "hired" => Some(ApplicationStatus::Hired),
            "withdrawn" => Some(ApplicationStatus::Withdrawn),
            _ => None,
        }
    }

    /// Statuses an employer may move an application to. Submitted is only
    /// an entry state and Withdrawn belongs to the candidate.
    pub fn is_employer_assignable(self) -> bool {
        !matches!(
            self,
            ApplicationStatus::Submitted | ApplicationStatus::Withdrawn
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub job_id: String,
    pub candidate_id: usize,
    pub cover_letter: Option<String>,
    pub status: ApplicationStatus,
    pub created: i64,
    pub updated: i64,
}

/// Application enriched with candidate identity, for the employer view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationWithCandidate {
    pub application: Application,
    pub candidate_handle: String,
    pub candidate_profile: Option<CandidateProfile>,
}
