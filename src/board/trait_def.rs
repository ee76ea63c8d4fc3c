use anyhow::Result;

use super::models::{Company, Job, JobFilter, JobStatus};
use crate::applications::ApplicationStore;
use crate::comments::CommentStore;
use crate::reviews::ReviewStore;

pub trait CompanyStore: Send + Sync {
    /// Inserts a new company row.
    fn add_company(&self, company: &Company) -> Result<()>;

    /// Returns a company by id.
    /// Returns Ok(None) if it does not exist.
    fn get_company(&self, company_id: &str) -> Result<Option<Company>>;

    /// Returns a company by its (unique) name.
    fn get_company_by_name(&self, name: &str) -> Result<Option<Company>>;

    /// Replaces the mutable fields of a company.
    fn update_company(&self, company: &Company) -> Result<()>;

    /// Returns companies ordered by name.
    fn get_companies(&self, limit: usize, offset: usize) -> Result<Vec<Company>>;

    /// Total number of companies.
    fn count_companies(&self) -> Result<usize>;
}

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait JobStore: Send + Sync {
    /// Inserts a new job row, resolving category, location and skills.
    fn add_job(&self, job: &Job) -> Result<()>;

    /// Returns a job by id.
    /// Returns Ok(None) if it does not exist.
    fn get_job(&self, job_id: &str) -> Result<Option<Job>>;

    /// Replaces the content fields of a job and stamps `updated`.
    fn update_job(&self, job: &Job) -> Result<()>;

    /// Deletes a job. Applications and comments go with it.
    fn delete_job(&self, job_id: &str) -> Result<()>;

    /// Sets the status of a job and stamps `updated`.
    fn set_job_status(&self, job_id: &str, status: JobStatus) -> Result<()>;

    /// Filtered, paginated listing. Returns the page and the total count
    /// matching the filter.
    fn list_jobs(&self, filter: &JobFilter) -> Result<(Vec<Job>, usize)>;

    /// Flips every Active job whose deadline lies before `now` to Expired.
    /// Returns the number of jobs expired.
    fn expire_overdue_jobs(&self, now: i64) -> Result<usize>;

    /// Number of jobs, optionally restricted to a status.
    fn count_jobs(&self, status: Option<JobStatus>) -> Result<usize>;

    /// All category names in use.
    fn get_categories(&self) -> Result<Vec<String>>;

    /// All location names in use.
    fn get_locations(&self) -> Result<Vec<String>>;

    /// All skill names in use.
    fn get_skills(&self) -> Result<Vec<String>>;
}

/// Combined trait for the full board storage surface.
pub trait BoardStore:
    CompanyStore + JobStore + ApplicationStore + CommentStore + ReviewStore
{
}

// Blanket implementation for any type implementing all the parts
impl<T: CompanyStore + JobStore + ApplicationStore + CommentStore + ReviewStore> BoardStore for T {}
