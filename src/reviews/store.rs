use anyhow::Result;

use super::models::{Review, ReviewAggregate};

/// Storage operations for company reviews, implemented by the board store.
pub trait ReviewStore: Send + Sync {
    /// Inserts a new review row.
    fn add_review(&self, review: &Review) -> Result<()>;

    /// Returns a review by id.
    /// Returns Ok(None) if it does not exist.
    fn get_review(&self, review_id: &str) -> Result<Option<Review>>;

    /// Returns the review a user wrote for a company, if any.
    fn get_review_by_author(
        &self,
        company_id: &str,
        author_id: usize,
    ) -> Result<Option<Review>>;

    /// Returns all reviews of a company, newest first.
    fn get_company_reviews(&self, company_id: &str) -> Result<Vec<Review>>;

    /// Deletes a review.
    fn delete_review(&self, review_id: &str) -> Result<()>;

    /// Average rating and count over a company's reviews.
    fn get_company_review_aggregate(&self, company_id: &str) -> Result<ReviewAggregate>;
}
