//! The job board: companies, postings and their lifecycle, taxonomy.

mod lifecycle;
mod manager;
mod models;
mod null_store;
mod schema;
mod store;
mod trait_def;

pub use lifecycle::JobStatus;
pub use manager::{BoardError, BoardManager, BoardResult, JobContent};
pub use models::{BoardStats, Company, EmploymentType, Job, JobFilter, JobPage};
pub use null_store::NullBoardStore;
pub use store::SqliteBoardStore;
pub use trait_def::{BoardStore, CompanyStore, JobStore};
