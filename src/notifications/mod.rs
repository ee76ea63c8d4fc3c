//! User notifications module

mod models;
mod store;

pub use models::{
    ApplicationReceivedData, ApplicationStatusChangedData, JobPublishedData, Notification,
    NotificationKind,
};
pub use store::NotificationStore;
