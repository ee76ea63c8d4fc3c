//! Notification data models

use serde::{Deserialize, Serialize};

/// Notification kind enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ApplicationReceived,
    ApplicationStatusChanged,
    JobPublished,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::ApplicationReceived => "application_received",
            NotificationKind::ApplicationStatusChanged => "application_status_changed",
            NotificationKind::JobPublished => "job_published",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "application_received" => Some(NotificationKind::ApplicationReceived),
            "application_status_changed" => Some(NotificationKind::ApplicationStatusChanged),
            "job_published" => Some(NotificationKind::JobPublished),
            _ => None,
        }
    }
}

/// A user notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub body: Option<String>,
    pub data: serde_json::Value,
    pub read_at: Option<i64>,
    pub created_at: i64,
}

/// Data payload for ApplicationReceived notifications (sent to the job author)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationReceivedData {
    pub application_id: String,
    pub job_id: String,
    pub job_title: String,
    pub candidate_handle: String,
}

/// Data payload for ApplicationStatusChanged notifications (sent to the candidate)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationStatusChangedData {
    pub application_id: String,
    pub job_id: String,
    pub job_title: String,
    pub status: String,
}

/// Data payload for JobPublished notifications (sent to company followers)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPublishedData {
    pub job_id: String,
    pub job_title: String,
    pub company_id: String,
    pub company_name: String,
}
