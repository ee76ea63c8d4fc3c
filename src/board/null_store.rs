//! A board store that holds nothing, for tools that only need the user
//! database (the auth CLI constructs a UserManager against it).

use anyhow::Result;

use super::models::{Company, Job, JobFilter, JobStatus};
use super::trait_def::{CompanyStore, JobStore};
use crate::applications::{Application, ApplicationStatus, ApplicationStore};
use crate::comments::{Comment, CommentStore};
use crate::reviews::{Review, ReviewAggregate, ReviewStore};

pub struct NullBoardStore;

impl CompanyStore for NullBoardStore {
    fn add_company(&self, _company: &Company) -> Result<()> {
        Ok(())
    }

    fn get_company(&self, _company_id: &str) -> Result<Option<Company>> {
        Ok(None)
    }

    fn get_company_by_name(&self, _name: &str) -> Result<Option<Company>> {
        Ok(None)
    }

    fn update_company(&self, _company: &Company) -> Result<()> {
        Ok(())
    }

    fn get_companies(&self, _limit: usize, _offset: usize) -> Result<Vec<Company>> {
        Ok(vec![])
    }

    fn count_companies(&self) -> Result<usize> {
        Ok(0)
    }
}

impl JobStore for NullBoardStore {
    fn add_job(&self, _job: &Job) -> Result<()> {
        Ok(())
    }

    fn get_job(&self, _job_id: &str) -> Result<Option<Job>> {
        Ok(None)
    }

    fn update_job(&self, _job: &Job) -> Result<()> {
        Ok(())
    }

    fn delete_job(&self, _job_id: &str) -> Result<()> {
        Ok(())
    }

    fn set_job_status(&self, _job_id: &str, _status: JobStatus) -> Result<()> {
        Ok(())
    }

    fn list_jobs(&self, _filter: &JobFilter) -> Result<(Vec<Job>, usize)> {
        Ok((vec![], 0))
    }

    fn expire_overdue_jobs(&self, _now: i64) -> Result<usize> {
        Ok(0)
    }

    fn count_jobs(&self, _status: Option<JobStatus>) -> Result<usize> {
        Ok(0)
    }

    fn get_categories(&self) -> Result<Vec<String>> {
        Ok(vec![])
    }

    fn get_locations(&self) -> Result<Vec<String>> {
        Ok(vec![])
    }

    fn get_skills(&self) -> Result<Vec<String>> {
        Ok(vec![])
    }
}

impl ApplicationStore for NullBoardStore {
    fn add_application(&self, _application: &Application) -> Result<()> {
        Ok(())
    }

    fn get_application(&self, _application_id: &str) -> Result<Option<Application>> {
        Ok(None)
    }

    fn get_application_for_candidate(
        &self,
        _job_id: &str,
        _candidate_id: usize,
    ) -> Result<Option<Application>> {
        Ok(None)
    }

    fn get_job_applications(&self, _job_id: &str) -> Result<Vec<Application>> {
        Ok(vec![])
    }

    fn get_candidate_applications(&self, _candidate_id: usize) -> Result<Vec<Application>> {
        Ok(vec![])
    }

    fn set_application_status(
        &self,
        _application_id: &str,
        _status: ApplicationStatus,
    ) -> Result<()> {
        Ok(())
    }

    fn count_applications(&self) -> Result<usize> {
        Ok(0)
    }
}

impl CommentStore for NullBoardStore {
    fn add_comment(&self, _comment: &Comment) -> Result<()> {
        Ok(())
    }

    fn get_comment(&self, _comment_id: &str) -> Result<Option<Comment>> {
        Ok(None)
    }

    fn get_job_comments(&self, _job_id: &str) -> Result<Vec<Comment>> {
        Ok(vec![])
    }

    fn update_comment_body(&self, _comment_id: &str, _body: &str) -> Result<()> {
        Ok(())
    }

    fn delete_comment(&self, _comment_id: &str) -> Result<()> {
        Ok(())
    }
}

impl ReviewStore for NullBoardStore {
    fn add_review(&self, _review: &Review) -> Result<()> {
        Ok(())
    }

    fn get_review(&self, _review_id: &str) -> Result<Option<Review>> {
        Ok(None)
    }

    fn get_review_by_author(
        &self,
        _company_id: &str,
        _author_id: usize,
    ) -> Result<Option<Review>> {
        Ok(None)
    }

    fn get_company_reviews(&self, _company_id: &str) -> Result<Vec<Review>> {
        Ok(vec![])
    }

    fn delete_review(&self, _review_id: &str) -> Result<()> {
        Ok(())
    }

    fn get_company_review_aggregate(&self, _company_id: &str) -> Result<ReviewAggregate> {
        Ok(ReviewAggregate {
            average_rating: None,
            review_count: 0,
        })
    }
}
