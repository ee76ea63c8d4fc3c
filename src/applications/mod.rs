//! Job applications: candidate submissions and the employer review flow.

mod manager;
mod models;
mod store;

pub use manager::ApplicationManager;
pub use models::{Application, ApplicationStatus, ApplicationWithCandidate};
pub use store::ApplicationStore;
