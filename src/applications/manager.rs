use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::warn;
use uuid::Uuid;

use super::models::{Application, ApplicationStatus, ApplicationWithCandidate};
use super::store::ApplicationStore;
use crate::board::{BoardError, BoardResult, BoardStore, JobStatus, JobStore};
use crate::notifications::{
    ApplicationReceivedData, ApplicationStatusChangedData, NotificationKind, NotificationStore,
};
use crate::user::{FullUserStore, UserContentStore, UserStore};

fn now_ts() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Service layer for the application flow: candidates submit and withdraw,
/// employers review and move statuses. Both sides get notification rows.
pub struct ApplicationManager {
    board_store: Arc<dyn BoardStore>,
    user_store: Arc<dyn FullUserStore>,
}

impl ApplicationManager {
    pub fn new(board_store: Arc<dyn BoardStore>, user_store: Arc<dyn FullUserStore>) -> Self {
        Self {
            board_store,
            user_store,
        }
    }

    pub fn apply(
        &self,
        job_id: &str,
        candidate_id: usize,
        cover_letter: Option<String>,
    ) -> BoardResult<Application> {
        let job = self
            .board_store
            .get_job(job_id)?
            .ok_or(BoardError::NotFound("Job"))?;

        // Drafts don't exist as far as candidates are concerned
        if job.status == JobStatus::Draft {
            return Err(BoardError::NotFound("Job"));
        }

        // Expiry check runs before the request is evaluated
        let now = now_ts();
        let mut status = job.status;
        if status.has_expired(job.deadline, now) {
            self.board_store.set_job_status(job_id, JobStatus::Expired)?;
            status = JobStatus::Expired;
        }
        if status != JobStatus::Active {
            return Err(BoardError::JobNotOpen);
        }

        if job.author_id == candidate_id {
            return Err(BoardError::Forbidden);
        }
        if self
            .board_store
            .get_application_for_candidate(job_id, candidate_id)?
            .is_some()
        {
            return Err(BoardError::DuplicateApplication);
        }

        let application = Application {
            id: Uuid::new_v4().to_string(),
            job_id: job_id.to_string(),
            candidate_id,
            cover_letter,
            status: ApplicationStatus::Submitted,
            created: now,
            updated: now,
        };
        self.board_store.add_application(&application)?;

        self.notify_author(&job.title, job.author_id, &application);
        Ok(application)
    }

    /// Notification row for the job author. Failures are logged and do not
    /// fail the submission.
    fn notify_author(&self, job_title: &str, author_id: usize, application: &Application) {
        let candidate_handle = self
            .user_store
            .get_user_handle(application.candidate_id)
            .ok()
            .flatten()
            .unwrap_or_else(|| format!("user {}", application.candidate_id));

        let data = ApplicationReceivedData {
            application_id: application.id.clone(),
            job_id: application.job_id.clone(),
            job_title: job_title.to_string(),
            candidate_handle: candidate_handle.clone(),
        };
        let payload = match serde_json::to_value(&data) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("Failed to encode application_received payload: {}", err);
                return;
            }
        };
        if let Err(err) = self.user_store.create_notification(
            author_id,
            NotificationKind::ApplicationReceived,
            format!("New application for {}", job_title),
            Some(format!("From {}", candidate_handle)),
            payload,
        ) {
            warn!("Failed to notify author {}: {}", author_id, err);
        }
    }

    pub fn withdraw(
        &self,
        application_id: &str,
        candidate_id: usize,
    ) -> BoardResult<Application> {
        let application = self
            .board_store
            .get_application(application_id)?
            .ok_or(BoardError::NotFound("Application"))?;
        if application.candidate_id != candidate_id {
            return Err(BoardError::Forbidden);
        }
        if application.status == ApplicationStatus::Withdrawn {
            return Err(BoardError::InvalidInput(
                "The application is already withdrawn.".to_string(),
            ));
        }
        self.board_store
            .set_application_status(application_id, ApplicationStatus::Withdrawn)?;
        Ok(Application {
            status: ApplicationStatus::Withdrawn,
            updated: now_ts(),
            ..application
        })
    }

    pub fn list_for_candidate(&self, candidate_id: usize) -> BoardResult<Vec<Application>> {
        Ok(self.board_store.get_candidate_applications(candidate_id)?)
    }

    pub fn list_for_job(
        &self,
        job_id: &str,
        actor_id: usize,
        is_admin: bool,
    ) -> BoardResult<Vec<ApplicationWithCandidate>> {
        let job = self
            .board_store
            .get_job(job_id)?
            .ok_or(BoardError::NotFound("Job"))?;
        if job.author_id != actor_id && !is_admin {
            return Err(BoardError::Forbidden);
        }

        let applications = self.board_store.get_job_applications(job_id)?;
        let mut enriched = Vec::with_capacity(applications.len());
        for application in applications {
            let candidate_handle = self
                .user_store
                .get_user_handle(application.candidate_id)?
                .unwrap_or_else(|| format!("user {}", application.candidate_id));
            let candidate_profile = self
                .user_store
                .get_candidate_profile(application.candidate_id)?;
            enriched.push(ApplicationWithCandidate {
                application,
                candidate_handle,
                candidate_profile,
            });
        }
        Ok(enriched)
    }

    pub fn set_status(
        &self,
        application_id: &str,
        actor_id: usize,
        is_admin: bool,
        status: ApplicationStatus,
    ) -> BoardResult<Application> {
        let application = self
            .board_store
            .get_application(application_id)?
            .ok_or(BoardError::NotFound("Application"))?;
        let job = self
            .board_store
            .get_job(&application.job_id)?
            .ok_or(BoardError::NotFound("Job"))?;
        if job.author_id != actor_id && !is_admin {
            return Err(BoardError::Forbidden);
        }
        if !status.is_employer_assignable() {
            return Err(BoardError::InvalidInput(format!(
                "Applications cannot be moved to {}.",
                status.as_str()
            )));
        }
        if application.status == ApplicationStatus::Withdrawn {
            return Err(BoardError::InvalidInput(
                "The application was withdrawn by the candidate.".to_string(),
            ));
        }

        self.board_store
            .set_application_status(application_id, status)?;
        let updated = Application {
            status,
            updated: now_ts(),
            ..application
        };
        self.notify_candidate(&job.title, &updated);
        Ok(updated)
    }

    /// Notification row for the candidate. Failures are logged and do not
    /// fail the status move.
    fn notify_candidate(&self, job_title: &str, application: &Application) {
        let data = ApplicationStatusChangedData {
            application_id: application.id.clone(),
            job_id: application.job_id.clone(),
            job_title: job_title.to_string(),
            status: application.status.as_str().to_string(),
        };
        let payload = match serde_json::to_value(&data) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("Failed to encode application_status_changed payload: {}", err);
                return;
            }
        };
        if let Err(err) = self.user_store.create_notification(
            application.candidate_id,
            NotificationKind::ApplicationStatusChanged,
            format!("Your application for {} is {}", job_title, application.status.as_str()),
            None,
            payload,
        ) {
            warn!(
                "Failed to notify candidate {}: {}",
                application.candidate_id, err
            );
        }
    }
}
