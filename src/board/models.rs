use serde::{Deserialize, Serialize};

pub use super::lifecycle::JobStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
    Internship,
}

impl EmploymentType {
    pub fn as_str(self) -> &'static str {
        match self {
            EmploymentType::FullTime => "full_time",
            EmploymentType::PartTime => "part_time",
            EmploymentType::Contract => "contract",
            EmploymentType::Internship => "internship",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "full_time" => Some(EmploymentType::FullTime),
            "part_time" => Some(EmploymentType::PartTime),
            "contract" => Some(EmploymentType::Contract),
            "internship" => Some(EmploymentType::Internship),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub description: String,
    pub website: Option<String>,
    pub location: Option<String>,
    pub owner_id: usize,
    pub created: i64,
}

/// A job posting. Category, location and skills are stored normalized in
/// their own tables but surfaced by name on the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub company_id: String,
    pub author_id: usize,
    pub title: String,
    pub description: String,
    pub employment_type: EmploymentType,
    pub salary_min: Option<u32>,
    pub salary_max: Option<u32>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub skills: Vec<String>,
    pub status: JobStatus,
    pub deadline: Option<i64>,
    pub created: i64,
    pub updated: i64,
}

/// Listing filter. `author_id` widens the visible statuses to the caller's
/// own jobs; everyone else only ever sees Active postings.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub query: Option<String>,
    pub company_id: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<EmploymentType>,
    pub status: Option<JobStatus>,
    pub author_id: Option<usize>,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPage {
    pub jobs: Vec<Job>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// Board-wide counters for the admin stats endpoint and the metrics gauges.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoardStats {
    pub companies: usize,
    pub jobs_total: usize,
    pub jobs_active: usize,
    pub applications: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employment_type_str_roundtrip() {
        for et in [
            EmploymentType::FullTime,
            EmploymentType::PartTime,
            EmploymentType::Contract,
            EmploymentType::Internship,
        ] {
            assert_eq!(EmploymentType::from_str(et.as_str()), Some(et));
        }
        assert_eq!(EmploymentType::from_str("freelance"), None);
    }

    #[test]
    fn employment_type_serde_matches_db_encoding() {
        let serialized = serde_json::to_string(&EmploymentType::FullTime).unwrap();
        assert_eq!(serialized, "\"full_time\"");
    }
}
