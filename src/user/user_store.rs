use super::auth::{AuthToken, AuthTokenValue, UserAuthCredentials};
use super::permissions::{Permission, PermissionGrant, UserRole};
use super::user_models::{CandidateProfile, User};
use crate::notifications::NotificationStore;
use anyhow::Result;

pub trait UserAuthCredentialsStore: Send + Sync {
    /// Returns the user's authentication credentials given the user handle.
    /// Returns Ok(None) if the user does not exist.
    /// Returns Err if there is a database error.
    fn get_user_auth_credentials(&self, user_handle: &str) -> Result<Option<UserAuthCredentials>>;

    /// Updates the user's authentication credentials.
    fn update_user_auth_credentials(&self, credentials: UserAuthCredentials) -> Result<()>;
}

pub trait UserAuthTokenStore: Send + Sync {
    /// Returns a user's authentication token given an AuthTokenValue.
    /// Returns Ok(None) if the token does not exist.
    fn get_user_auth_token(&self, token: &AuthTokenValue) -> Result<Option<AuthToken>>;

    /// Deletes an auth token given the token value and returns it.
    /// Returns Ok(None) if the token does not exist.
    fn delete_user_auth_token(&self, token: &AuthTokenValue) -> Result<Option<AuthToken>>;

    /// Stamps an auth token with the current timestamp.
    fn update_user_auth_token_last_used_timestamp(&self, token: &AuthTokenValue) -> Result<()>;

    /// Adds a new auth token.
    fn add_user_auth_token(&self, token: AuthToken) -> Result<()>;

    /// Returns all auth tokens of the user with the given handle.
    fn get_all_user_auth_tokens(&self, user_handle: &str) -> Result<Vec<AuthToken>>;

    /// Prunes auth tokens that haven't been used for the specified duration.
    /// Returns the number of tokens that were deleted.
    fn prune_unused_auth_tokens(&self, unused_for_days: u64) -> Result<usize>;
}

pub trait UserStore: Send + Sync {
    /// Creates a new user and returns the user id.
    fn create_user(&self, user_handle: &str) -> Result<usize>;

    /// Returns a user's handle given the user id.
    /// Returns Ok(None) if the user does not exist.
    fn get_user_handle(&self, user_id: usize) -> Result<Option<String>>;

    /// Returns a user's id given the handle.
    /// Returns Ok(None) if the user does not exist.
    fn get_user_id(&self, user_handle: &str) -> Result<Option<usize>>;

    /// Returns all users' handles.
    fn get_all_user_handles(&self) -> Result<Vec<String>>;

    /// Returns all user rows.
    fn get_all_users(&self) -> Result<Vec<User>>;

    /// Returns all roles assigned to a user.
    fn get_user_roles(&self, user_id: usize) -> Result<Vec<UserRole>>;

    /// Assigns a role to a user. Assigning an already-held role is a no-op.
    fn add_user_role(&self, user_id: usize, role: UserRole) -> Result<()>;

    /// Removes a role from a user.
    fn remove_user_role(&self, user_id: usize, role: UserRole) -> Result<()>;

    /// Adds an extra permission grant to a user. Returns the grant id.
    fn add_user_extra_permission(&self, user_id: usize, grant: PermissionGrant) -> Result<usize>;

    /// Removes an extra permission grant by its id.
    fn remove_user_extra_permission(&self, permission_id: usize) -> Result<()>;

    /// Decrements the countdown of an extra permission grant.
    /// Returns true if the permission still has uses remaining, false otherwise.
    fn decrement_permission_countdown(&self, permission_id: usize) -> Result<bool>;

    /// Resolves all permissions for a user (roles + active extra grants).
    fn resolve_user_permissions(&self, user_id: usize) -> Result<Vec<Permission>>;
}

/// Per-user board bookkeeping that lives in the user database: saved jobs,
/// company follows and the candidate profile. Job and company ids are plain
/// strings here, the board database is a separate file.
pub trait UserContentStore: Send + Sync {
    /// Saves or unsaves a job for the user.
    fn set_saved_job(&self, user_id: usize, job_id: &str, saved: bool) -> Result<()>;

    /// Returns whether the user saved the given job.
    fn is_job_saved(&self, user_id: usize, job_id: &str) -> Result<bool>;

    /// Returns the ids of the user's saved jobs, newest first.
    fn get_saved_jobs(&self, user_id: usize) -> Result<Vec<String>>;

    /// Follows or unfollows a company for the user.
    fn set_company_follow(&self, user_id: usize, company_id: &str, following: bool) -> Result<()>;

    /// Returns whether the user follows the given company.
    fn is_following_company(&self, user_id: usize, company_id: &str) -> Result<bool>;

    /// Returns the ids of the companies the user follows, newest first.
    fn get_followed_companies(&self, user_id: usize) -> Result<Vec<String>>;

    /// Returns the ids of all users following the given company.
    fn get_company_followers(&self, company_id: &str) -> Result<Vec<usize>>;

    /// Returns the user's candidate profile, if one was created.
    fn get_candidate_profile(&self, user_id: usize) -> Result<Option<CandidateProfile>>;

    /// Creates or replaces the user's candidate profile.
    fn upsert_candidate_profile(&self, profile: &CandidateProfile) -> Result<()>;
}

/// Combined trait for the full user storage surface.
pub trait FullUserStore:
    UserStore + UserAuthTokenStore + UserAuthCredentialsStore + UserContentStore + NotificationStore
{
}

// Blanket implementation for any type implementing all the parts
impl<
        T: UserStore
            + UserAuthTokenStore
            + UserAuthCredentialsStore
            + UserContentStore
            + NotificationStore,
    > FullUserStore for T
{
}
