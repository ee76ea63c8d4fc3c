use serde::{Deserialize, Serialize};

/// A comment on a job posting. Replies carry the id of their parent
/// comment, top-level comments have none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub job_id: String,
    pub author_id: usize,
    pub parent_id: Option<String>,
    pub body: String,
    pub edited: bool,
    pub created: i64,
}
