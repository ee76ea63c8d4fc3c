pub mod auth;
mod permissions;
mod sqlite_user_store;
mod user_manager;
pub mod user_models;
mod user_store;

pub use auth::{AuthToken, AuthTokenValue, UserAuthCredentials, UsernamePasswordCredentials};
pub use permissions::{Permission, PermissionGrant, UserRole};
pub use sqlite_user_store::SqliteUserStore;
pub use user_manager::UserManager;
pub use user_models::{CandidateProfile, User, UserSummary};
pub use user_store::{
    FullUserStore, UserAuthCredentialsStore, UserAuthTokenStore, UserContentStore, UserStore,
};
