use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use super::models::{BoardStats, Company, EmploymentType, Job, JobFilter, JobPage, JobStatus};
use super::trait_def::{BoardStore, CompanyStore, JobStore};
use crate::applications::ApplicationStore;
use crate::comments::{Comment, CommentStore};
use crate::notifications::{JobPublishedData, NotificationKind, NotificationStore};
use crate::reviews::{Review, ReviewAggregate, ReviewStore};
use crate::user::{FullUserStore, UserContentStore};

const MAX_JOB_SKILLS: usize = 20;
const DEFAULT_PAGE_SIZE: usize = 20;
const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    InvalidInput(String),
    #[error("Not allowed")]
    Forbidden,
    #[error("The job posting is expired")]
    JobExpired,
    #[error("The job posting is not open for applications")]
    JobNotOpen,
    #[error("Already applied to this job")]
    DuplicateApplication,
    #[error("Already reviewed this company")]
    DuplicateReview,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub type BoardResult<T> = Result<T, BoardError>;

fn now_ts() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Content fields of a job posting, as submitted on create and update.
#[derive(Debug, Clone)]
pub struct JobContent {
    pub title: String,
    pub description: String,
    pub employment_type: EmploymentType,
    pub salary_min: Option<u32>,
    pub salary_max: Option<u32>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub skills: Vec<String>,
    pub deadline: Option<i64>,
}

impl JobContent {
    fn validate(&self) -> BoardResult<()> {
        if self.title.trim().is_empty() {
            return Err(BoardError::InvalidInput(
                "The job title cannot be empty.".to_string(),
            ));
        }
        if self.description.trim().is_empty() {
            return Err(BoardError::InvalidInput(
                "The job description cannot be empty.".to_string(),
            ));
        }
        if let (Some(min), Some(max)) = (self.salary_min, self.salary_max) {
            if min > max {
                return Err(BoardError::InvalidInput(format!(
                    "salary_min {} is greater than salary_max {}.",
                    min, max
                )));
            }
        }
        if self.skills.len() > MAX_JOB_SKILLS {
            return Err(BoardError::InvalidInput(format!(
                "Too many skills listed, the maximum is {} (attempted: {}).",
                MAX_JOB_SKILLS,
                self.skills.len()
            )));
        }
        Ok(())
    }
}

/// Service layer for companies, job postings and their community content.
/// Holds the lifecycle policy: the expiry check runs before every read or
/// toggle, and toggles are rejected while a posting is Expired.
pub struct BoardManager {
    board_store: Arc<dyn BoardStore>,
    user_store: Arc<dyn FullUserStore>,
}

impl BoardManager {
    pub fn new(board_store: Arc<dyn BoardStore>, user_store: Arc<dyn FullUserStore>) -> Self {
        Self {
            board_store,
            user_store,
        }
    }

    // ------------------------------------------------------------------
    // Companies
    // ------------------------------------------------------------------

    pub fn create_company(
        &self,
        owner_id: usize,
        name: String,
        description: String,
        website: Option<String>,
        location: Option<String>,
    ) -> BoardResult<Company> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(BoardError::InvalidInput(
                "The company name cannot be empty.".to_string(),
            ));
        }
        if self.board_store.get_company_by_name(&name)?.is_some() {
            return Err(BoardError::InvalidInput(format!(
                "A company named '{}' already exists.",
                name
            )));
        }

        let company = Company {
            id: Uuid::new_v4().to_string(),
            name,
            description,
            website,
            location,
            owner_id,
            created: now_ts(),
        };
        self.board_store.add_company(&company)?;
        Ok(company)
    }

    pub fn update_company(
        &self,
        company_id: &str,
        actor_id: usize,
        is_admin: bool,
        name: Option<String>,
        description: Option<String>,
        website: Option<String>,
        location: Option<String>,
    ) -> BoardResult<Company> {
        let mut company = self
            .board_store
            .get_company(company_id)?
            .ok_or(BoardError::NotFound("Company"))?;
        if company.owner_id != actor_id && !is_admin {
            return Err(BoardError::Forbidden);
        }

        if let Some(name) = name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(BoardError::InvalidInput(
                    "The company name cannot be empty.".to_string(),
                ));
            }
            if name != company.name && self.board_store.get_company_by_name(&name)?.is_some() {
                return Err(BoardError::InvalidInput(format!(
                    "A company named '{}' already exists.",
                    name
                )));
            }
            company.name = name;
        }
        if let Some(description) = description {
            company.description = description;
        }
        if website.is_some() {
            company.website = website;
        }
        if location.is_some() {
            company.location = location;
        }

        self.board_store.update_company(&company)?;
        Ok(company)
    }

    pub fn get_company(&self, company_id: &str) -> BoardResult<(Company, ReviewAggregate)> {
        let company = self
            .board_store
            .get_company(company_id)?
            .ok_or(BoardError::NotFound("Company"))?;
        let aggregate = self.board_store.get_company_review_aggregate(company_id)?;
        Ok((company, aggregate))
    }

    pub fn list_companies(&self, limit: usize, offset: usize) -> BoardResult<Vec<Company>> {
        let limit = clamp_page_size(limit);
        Ok(self.board_store.get_companies(limit, offset)?)
    }

    // ------------------------------------------------------------------
    // Jobs
    // ------------------------------------------------------------------

    pub fn create_job(
        &self,
        author_id: usize,
        is_admin: bool,
        company_id: &str,
        content: JobContent,
    ) -> BoardResult<Job> {
        content.validate()?;
        let company = self
            .board_store
            .get_company(company_id)?
            .ok_or(BoardError::NotFound("Company"))?;
        if company.owner_id != author_id && !is_admin {
            return Err(BoardError::Forbidden);
        }
        if let Some(deadline) = content.deadline {
            if deadline < now_ts() {
                return Err(BoardError::InvalidInput(
                    "The application deadline is already in the past.".to_string(),
                ));
            }
        }

        let now = now_ts();
        let job = Job {
            id: Uuid::new_v4().to_string(),
            company_id: company.id,
            author_id,
            title: content.title,
            description: content.description,
            employment_type: content.employment_type,
            salary_min: content.salary_min,
            salary_max: content.salary_max,
            category: content.category,
            location: content.location,
            skills: content.skills,
            status: JobStatus::Draft,
            deadline: content.deadline,
            created: now,
            updated: now,
        };
        self.board_store.add_job(&job)?;
        Ok(job)
    }

    /// Persists the auto-expiry transition, then returns the job as it now
    /// stands. Runs before every read or toggle per the lifecycle policy.
    fn refresh_expiry(&self, mut job: Job) -> BoardResult<Job> {
        let now = now_ts();
        if job.status.has_expired(job.deadline, now) {
            self.board_store.set_job_status(&job.id, JobStatus::Expired)?;
            job.status = JobStatus::Expired;
            job.updated = now;
        }
        Ok(job)
    }

    fn load_job(&self, job_id: &str) -> BoardResult<Job> {
        let job = self
            .board_store
            .get_job(job_id)?
            .ok_or(BoardError::NotFound("Job"))?;
        self.refresh_expiry(job)
    }

    fn can_view(job: &Job, viewer_id: Option<usize>, is_admin: bool) -> bool {
        job.status != JobStatus::Draft || is_admin || viewer_id == Some(job.author_id)
    }

    pub fn get_job(
        &self,
        job_id: &str,
        viewer_id: Option<usize>,
        is_admin: bool,
    ) -> BoardResult<Job> {
        let job = self.load_job(job_id)?;
        if !Self::can_view(&job, viewer_id, is_admin) {
            // Drafts are invisible to everyone but their author
            return Err(BoardError::NotFound("Job"));
        }
        Ok(job)
    }

    pub fn update_job(
        &self,
        job_id: &str,
        actor_id: usize,
        is_admin: bool,
        content: JobContent,
    ) -> BoardResult<Job> {
        content.validate()?;
        let job = self.load_job(job_id)?;
        if job.author_id != actor_id && !is_admin {
            return Err(BoardError::Forbidden);
        }
        if job.status == JobStatus::Expired {
            return Err(BoardError::JobExpired);
        }
        if let Some(deadline) = content.deadline {
            if deadline < now_ts() {
                return Err(BoardError::InvalidInput(
                    "The application deadline is already in the past.".to_string(),
                ));
            }
        }

        let updated = Job {
            title: content.title,
            description: content.description,
            employment_type: content.employment_type,
            salary_min: content.salary_min,
            salary_max: content.salary_max,
            category: content.category,
            location: content.location,
            skills: content.skills,
            deadline: content.deadline,
            updated: now_ts(),
            ..job
        };
        self.board_store.update_job(&updated)?;
        Ok(updated)
    }

    pub fn delete_job(&self, job_id: &str, actor_id: usize, is_admin: bool) -> BoardResult<()> {
        let job = self
            .board_store
            .get_job(job_id)?
            .ok_or(BoardError::NotFound("Job"))?;
        if job.author_id != actor_id && !is_admin {
            return Err(BoardError::Forbidden);
        }
        self.board_store.delete_job(job_id)?;
        Ok(())
    }

    pub fn list_jobs(
        &self,
        mut filter: JobFilter,
        viewer_id: Option<usize>,
        is_admin: bool,
    ) -> BoardResult<JobPage> {
        // Lazy expiry on the read path, so listings never surface overdue
        // Active postings.
        self.board_store.expire_overdue_jobs(now_ts())?;

        let own_listing = filter.author_id.is_some() && filter.author_id == viewer_id;
        if !own_listing && !is_admin {
            filter.status = Some(JobStatus::Active);
        }
        filter.limit = clamp_page_size(filter.limit);

        let (jobs, total) = self.board_store.list_jobs(&filter)?;
        Ok(JobPage {
            jobs,
            total,
            limit: filter.limit,
            offset: filter.offset,
        })
    }

    pub fn publish_job(&self, job_id: &str, actor_id: usize, is_admin: bool) -> BoardResult<Job> {
        let job = self.load_job(job_id)?;
        if job.author_id != actor_id && !is_admin {
            return Err(BoardError::Forbidden);
        }
        match job.status {
            JobStatus::Draft => {}
            JobStatus::Expired => return Err(BoardError::JobExpired),
            other => {
                return Err(BoardError::InvalidInput(format!(
                    "Only drafts can be published, the job is {}.",
                    other.as_str()
                )))
            }
        }
        if let Some(deadline) = job.deadline {
            if deadline < now_ts() {
                return Err(BoardError::InvalidInput(
                    "Cannot publish with an application deadline in the past.".to_string(),
                ));
            }
        }

        self.board_store.set_job_status(job_id, JobStatus::Active)?;
        let job = Job {
            status: JobStatus::Active,
            updated: now_ts(),
            ..job
        };
        self.notify_followers(&job);
        Ok(job)
    }

    pub fn close_job(&self, job_id: &str, actor_id: usize, is_admin: bool) -> BoardResult<Job> {
        self.toggle(job_id, actor_id, is_admin, JobStatus::Active, JobStatus::Closed)
    }

    /// Reopening is evaluated after the expiry check, so a Closed job with a
    /// past deadline does reopen and then expires on its next read.
    pub fn reopen_job(&self, job_id: &str, actor_id: usize, is_admin: bool) -> BoardResult<Job> {
        self.toggle(job_id, actor_id, is_admin, JobStatus::Closed, JobStatus::Active)
    }

    fn toggle(
        &self,
        job_id: &str,
        actor_id: usize,
        is_admin: bool,
        from: JobStatus,
        to: JobStatus,
    ) -> BoardResult<Job> {
        let job = self.load_job(job_id)?;
        if job.author_id != actor_id && !is_admin {
            return Err(BoardError::Forbidden);
        }
        if job.status == JobStatus::Expired {
            return Err(BoardError::JobExpired);
        }
        if job.status != from {
            return Err(BoardError::InvalidInput(format!(
                "Cannot move a {} job to {}.",
                job.status.as_str(),
                to.as_str()
            )));
        }
        self.board_store.set_job_status(job_id, to)?;
        Ok(Job {
            status: to,
            updated: now_ts(),
            ..job
        })
    }

    /// Fans a JobPublished notification out to the company's followers.
    /// Failures are logged and do not fail the publish.
    fn notify_followers(&self, job: &Job) {
        let company_name = match self.board_store.get_company(&job.company_id) {
            Ok(Some(company)) => company.name,
            _ => job.company_id.clone(),
        };
        let followers = match self.user_store.get_company_followers(&job.company_id) {
            Ok(followers) => followers,
            Err(err) => {
                warn!("Failed to load followers of {}: {}", job.company_id, err);
                return;
            }
        };

        let data = JobPublishedData {
            job_id: job.id.clone(),
            job_title: job.title.clone(),
            company_id: job.company_id.clone(),
            company_name: company_name.clone(),
        };
        let payload = match serde_json::to_value(&data) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("Failed to encode job_published payload: {}", err);
                return;
            }
        };

        let mut notified = 0;
        for follower in followers {
            if follower == job.author_id {
                continue;
            }
            if let Err(err) = self.user_store.create_notification(
                follower,
                NotificationKind::JobPublished,
                format!("New job at {}", company_name),
                Some(job.title.clone()),
                payload.clone(),
            ) {
                warn!("Failed to notify follower {}: {}", follower, err);
            } else {
                notified += 1;
            }
        }
        if notified > 0 {
            info!("Notified {} followers of job {}", notified, job.id);
        }
    }

    /// Bulk sweep for the background task: expires every overdue Active job.
    pub fn expire_overdue_jobs(&self) -> BoardResult<usize> {
        Ok(self.board_store.expire_overdue_jobs(now_ts())?)
    }

    // ------------------------------------------------------------------
    // Comments
    // ------------------------------------------------------------------

    pub fn add_comment(
        &self,
        job_id: &str,
        author_id: usize,
        is_admin: bool,
        parent_id: Option<String>,
        body: String,
    ) -> BoardResult<Comment> {
        if body.trim().is_empty() {
            return Err(BoardError::InvalidInput(
                "The comment body cannot be empty.".to_string(),
            ));
        }
        // Commenting requires read access to the job
        self.get_job(job_id, Some(author_id), is_admin)?;

        if let Some(parent_id) = &parent_id {
            let parent = self
                .board_store
                .get_comment(parent_id)?
                .ok_or(BoardError::NotFound("Parent comment"))?;
            if parent.job_id != job_id {
                return Err(BoardError::InvalidInput(
                    "The parent comment belongs to another job.".to_string(),
                ));
            }
        }

        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            job_id: job_id.to_string(),
            author_id,
            parent_id,
            body,
            edited: false,
            created: now_ts(),
        };
        self.board_store.add_comment(&comment)?;
        Ok(comment)
    }

    pub fn get_job_comments(
        &self,
        job_id: &str,
        viewer_id: Option<usize>,
        is_admin: bool,
    ) -> BoardResult<Vec<Comment>> {
        self.get_job(job_id, viewer_id, is_admin)?;
        Ok(self.board_store.get_job_comments(job_id)?)
    }

    pub fn update_comment(
        &self,
        comment_id: &str,
        actor_id: usize,
        body: String,
    ) -> BoardResult<Comment> {
        if body.trim().is_empty() {
            return Err(BoardError::InvalidInput(
                "The comment body cannot be empty.".to_string(),
            ));
        }
        let comment = self
            .board_store
            .get_comment(comment_id)?
            .ok_or(BoardError::NotFound("Comment"))?;
        if comment.author_id != actor_id {
            return Err(BoardError::Forbidden);
        }
        self.board_store.update_comment_body(comment_id, &body)?;
        Ok(Comment {
            body,
            edited: true,
            ..comment
        })
    }

    pub fn delete_comment(
        &self,
        comment_id: &str,
        actor_id: usize,
        can_moderate: bool,
    ) -> BoardResult<()> {
        let comment = self
            .board_store
            .get_comment(comment_id)?
            .ok_or(BoardError::NotFound("Comment"))?;
        if comment.author_id != actor_id && !can_moderate {
            return Err(BoardError::Forbidden);
        }
        self.board_store.delete_comment(comment_id)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Reviews
    // ------------------------------------------------------------------

    pub fn add_review(
        &self,
        company_id: &str,
        author_id: usize,
        rating: u8,
        title: String,
        body: Option<String>,
    ) -> BoardResult<Review> {
        let company = self
            .board_store
            .get_company(company_id)?
            .ok_or(BoardError::NotFound("Company"))?;
        if !(1..=5).contains(&rating) {
            return Err(BoardError::InvalidInput(format!(
                "The rating must be between 1 and 5 (got {}).",
                rating
            )));
        }
        if title.trim().is_empty() {
            return Err(BoardError::InvalidInput(
                "The review title cannot be empty.".to_string(),
            ));
        }
        if company.owner_id == author_id {
            return Err(BoardError::Forbidden);
        }
        if self
            .board_store
            .get_review_by_author(company_id, author_id)?
            .is_some()
        {
            return Err(BoardError::DuplicateReview);
        }

        let review = Review {
            id: Uuid::new_v4().to_string(),
            company_id: company_id.to_string(),
            author_id,
            rating,
            title,
            body,
            created: now_ts(),
        };
        self.board_store.add_review(&review)?;
        Ok(review)
    }

    pub fn get_company_reviews(&self, company_id: &str) -> BoardResult<Vec<Review>> {
        if self.board_store.get_company(company_id)?.is_none() {
            return Err(BoardError::NotFound("Company"));
        }
        Ok(self.board_store.get_company_reviews(company_id)?)
    }

    pub fn delete_review(
        &self,
        review_id: &str,
        actor_id: usize,
        can_moderate: bool,
    ) -> BoardResult<()> {
        let review = self
            .board_store
            .get_review(review_id)?
            .ok_or(BoardError::NotFound("Review"))?;
        if review.author_id != actor_id && !can_moderate {
            return Err(BoardError::Forbidden);
        }
        self.board_store.delete_review(review_id)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Taxonomy and stats
    // ------------------------------------------------------------------

    pub fn get_categories(&self) -> BoardResult<Vec<String>> {
        Ok(self.board_store.get_categories()?)
    }

    pub fn get_locations(&self) -> BoardResult<Vec<String>> {
        Ok(self.board_store.get_locations()?)
    }

    pub fn get_skills(&self) -> BoardResult<Vec<String>> {
        Ok(self.board_store.get_skills()?)
    }

    pub fn stats(&self) -> BoardResult<BoardStats> {
        Ok(BoardStats {
            companies: self.board_store.count_companies()?,
            jobs_total: self.board_store.count_jobs(None)?,
            jobs_active: self.board_store.count_jobs(Some(JobStatus::Active))?,
            applications: self.board_store.count_applications()?,
        })
    }
}

fn clamp_page_size(limit: usize) -> usize {
    if limit == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        limit.min(MAX_PAGE_SIZE)
    }
}
