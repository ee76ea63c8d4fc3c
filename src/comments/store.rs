use anyhow::Result;

use super::models::Comment;

/// Storage operations for job comments, implemented by the board store.
pub trait CommentStore: Send + Sync {
    /// Inserts a new comment row.
    fn add_comment(&self, comment: &Comment) -> Result<()>;

    /// Returns a comment by id.
    /// Returns Ok(None) if it does not exist.
    fn get_comment(&self, comment_id: &str) -> Result<Option<Comment>>;

    /// Returns all comments of a job in chronological order.
    fn get_job_comments(&self, job_id: &str) -> Result<Vec<Comment>>;

    /// Replaces the body of a comment and flags it as edited.
    fn update_comment_body(&self, comment_id: &str, body: &str) -> Result<()>;

    /// Deletes a comment. Replies go with it (cascade on the parent id).
    fn delete_comment(&self, comment_id: &str) -> Result<()>;
}
