//! Company reviews with an aggregate rating per company.

mod models;
mod store;

pub use models::{Review, ReviewAggregate};
pub use store::ReviewStore;
