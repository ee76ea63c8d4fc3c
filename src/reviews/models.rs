use serde::{Deserialize, Serialize};

/// A company review. Ratings run 1 to 5, one review per user per company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub company_id: String,
    pub author_id: usize,
    pub rating: u8,
    pub title: String,
    pub body: Option<String>,
    pub created: i64,
}

/// Aggregate over a company's reviews, embedded in the company payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReviewAggregate {
    pub average_rating: Option<f64>,
    pub review_count: usize,
}
