use anyhow::Result;

use super::models::{Application, ApplicationStatus};

/// Storage operations for job applications, implemented by the board store.
pub trait ApplicationStore: Send + Sync {
    /// Inserts a new application row.
    fn add_application(&self, application: &Application) -> Result<()>;

    /// Returns an application by id.
    /// Returns Ok(None) if it does not exist.
    fn get_application(&self, application_id: &str) -> Result<Option<Application>>;

    /// Returns the candidate's application to a job, if any.
    fn get_application_for_candidate(
        &self,
        job_id: &str,
        candidate_id: usize,
    ) -> Result<Option<Application>>;

    /// Returns all applications to a job, newest first.
    fn get_job_applications(&self, job_id: &str) -> Result<Vec<Application>>;

    /// Returns all applications submitted by a candidate, newest first.
    fn get_candidate_applications(&self, candidate_id: usize) -> Result<Vec<Application>>;

    /// Updates the status of an application and stamps `updated`.
    fn set_application_status(
        &self,
        application_id: &str,
        status: ApplicationStatus,
    ) -> Result<()>;

    /// Total number of applications on the board.
    fn count_applications(&self) -> Result<usize>;
}
