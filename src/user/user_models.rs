use serde::{Deserialize, Serialize};

use super::permissions::UserRole;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: usize,
    pub handle: String,
    pub created: i64,
}

/// User row enriched with roles, for the admin listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: usize,
    pub handle: String,
    pub roles: Vec<UserRole>,
    pub created: i64,
}

/// One profile row per candidate. All fields except the user id are
/// editable by the owner; the skills list is stored as a JSON array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub user_id: usize,
    pub full_name: String,
    pub headline: Option<String>,
    pub summary: Option<String>,
    pub location: Option<String>,
    pub years_experience: Option<u32>,
    pub skills: Vec<String>,
    pub updated: i64,
}
