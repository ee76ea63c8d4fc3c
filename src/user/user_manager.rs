use crate::board::{BoardStore, CompanyStore, JobStore};

use super::{
    auth::CredentialHasher,
    permissions::{Permission, PermissionGrant, UserRole},
    user_models::{CandidateProfile, UserSummary},
    user_store::{UserAuthCredentialsStore, UserAuthTokenStore, UserContentStore, UserStore},
    AuthToken, AuthTokenValue, FullUserStore, UserAuthCredentials, UsernamePasswordCredentials,
};
use anyhow::{bail, Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::{sync::Arc, time::SystemTime};

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PROFILE_SKILLS: usize = 50;

lazy_static! {
    static ref HANDLE_REGEX: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]{2,31}$").unwrap();
}

/// Service layer over the user store: account provisioning, credentials,
/// session tokens, roles, profile and per-user board bookkeeping.
pub struct UserManager {
    board_store: Arc<dyn BoardStore>,
    user_store: Arc<dyn FullUserStore>,
}

impl UserManager {
    pub fn new(board_store: Arc<dyn BoardStore>, user_store: Arc<dyn FullUserStore>) -> Self {
        Self {
            board_store,
            user_store,
        }
    }

    pub fn add_user<T: AsRef<str>>(&self, user_handle: T) -> Result<usize> {
        let user_handle = user_handle.as_ref();
        if !HANDLE_REGEX.is_match(user_handle) {
            bail!(
                "Invalid user handle '{}': 3-32 chars, letters, digits, '_', '.', '-'.",
                user_handle
            );
        }
        if self.user_store.get_user_id(user_handle)?.is_some() {
            bail!("User handle already exists.");
        }
        self.user_store.create_user(user_handle)
    }

    /// Self-service registration: a fresh account with password credentials
    /// and a Candidate or Employer role. Admin is never self-assignable.
    pub fn register_user(
        &self,
        user_handle: &str,
        password: String,
        role: UserRole,
    ) -> Result<usize> {
        if role == UserRole::Admin {
            bail!("The Admin role cannot be self-assigned.");
        }
        if password.len() < MIN_PASSWORD_LENGTH {
            bail!(
                "Password too short, at least {} characters required.",
                MIN_PASSWORD_LENGTH
            );
        }
        let user_id = self.add_user(user_handle)?;
        self.create_password_credentials(user_handle, password)?;
        self.user_store.add_user_role(user_id, role)?;
        Ok(user_id)
    }

    pub fn get_user_id(&self, user_handle: &str) -> Result<Option<usize>> {
        self.user_store.get_user_id(user_handle)
    }

    pub fn get_user_handle(&self, user_id: usize) -> Result<Option<String>> {
        self.user_store.get_user_handle(user_id)
    }

    fn create_hashed_password(
        user_id: usize,
        password: String,
    ) -> Result<UsernamePasswordCredentials> {
        let hasher = CredentialHasher::default_hasher();
        let salt = hasher.generate_b64_salt();
        let hash = hasher.hash(password.as_bytes(), &salt)?;
        Ok(UsernamePasswordCredentials {
            user_id,
            salt,
            hash,
            hasher,
            created: SystemTime::now(),
            last_tried: None,
            last_used: None,
        })
    }

    pub fn create_password_credentials(&self, user_handle: &str, password: String) -> Result<()> {
        if let Some(credentials) = self.user_store.get_user_auth_credentials(user_handle)? {
            if credentials.username_password.is_some() {
                bail!(
                    "User with handle {} already has password credentials. Maybe you want to update them?",
                    user_handle
                );
            }
        }

        let user_id = self
            .user_store
            .get_user_id(user_handle)?
            .with_context(|| format!("User with handle {} not found.", user_handle))?;

        let credentials = UserAuthCredentials {
            user_id,
            username_password: Some(Self::create_hashed_password(user_id, password)?),
        };
        self.user_store.update_user_auth_credentials(credentials)
    }

    pub fn update_password_credentials(&self, user_handle: &str, password: String) -> Result<()> {
        let mut credentials = self
            .user_store
            .get_user_auth_credentials(user_handle)?
            .with_context(|| format!("User with handle {} not found.", user_handle))?;
        if credentials.username_password.is_none() {
            bail!(
                "Cannot update password of user with handle {} since it never had one.",
                user_handle
            );
        }
        credentials.username_password =
            Some(Self::create_hashed_password(credentials.user_id, password)?);
        self.user_store.update_user_auth_credentials(credentials)
    }

    pub fn delete_password_credentials(&self, user_handle: &str) -> Result<()> {
        let mut credentials = self
            .user_store
            .get_user_auth_credentials(user_handle)?
            .with_context(|| format!("User with handle {} not found.", user_handle))?;
        credentials.username_password = None;
        self.user_store.update_user_auth_credentials(credentials)
    }

    pub fn get_user_credentials(&self, user_handle: &str) -> Result<Option<UserAuthCredentials>> {
        self.user_store.get_user_auth_credentials(user_handle)
    }

    pub fn generate_auth_token(&self, credentials: &UserAuthCredentials) -> Result<AuthToken> {
        let token = AuthToken {
            user_id: credentials.user_id,
            value: AuthTokenValue::generate(),
            created: SystemTime::now(),
            last_used: None,
        };
        self.user_store.add_user_auth_token(token.clone())?;
        Ok(token)
    }

    pub fn get_auth_token(&self, value: &AuthTokenValue) -> Result<Option<AuthToken>> {
        self.user_store.get_user_auth_token(value)
    }

    pub fn update_auth_token_last_used(&self, value: &AuthTokenValue) -> Result<()> {
        self.user_store
            .update_user_auth_token_last_used_timestamp(value)
    }

    pub fn delete_auth_token(&self, user_id: usize, token_value: &AuthTokenValue) -> Result<()> {
        match self.user_store.delete_user_auth_token(token_value)? {
            Some(removed) => {
                if removed.user_id == user_id {
                    Ok(())
                } else {
                    // Someone else's token: put it back and refuse.
                    let _ = self.user_store.add_user_auth_token(removed.clone());
                    bail!(
                        "Tried to delete auth token of user {}, but the authenticated user {} is not its owner.",
                        removed.user_id,
                        user_id
                    )
                }
            }
            None => bail!("Auth token not found."),
        }
    }

    pub fn get_user_tokens(&self, user_handle: &str) -> Result<Vec<AuthToken>> {
        self.user_store.get_all_user_auth_tokens(user_handle)
    }

    pub fn get_all_user_handles(&self) -> Result<Vec<String>> {
        self.user_store.get_all_user_handles()
    }

    pub fn list_users(&self) -> Result<Vec<UserSummary>> {
        let users = self.user_store.get_all_users()?;
        let mut summaries = Vec::with_capacity(users.len());
        for user in users {
            summaries.push(UserSummary {
                roles: self.user_store.get_user_roles(user.id)?,
                id: user.id,
                handle: user.handle,
                created: user.created,
            });
        }
        Ok(summaries)
    }

    pub fn get_user_permissions(&self, user_id: usize) -> Result<Vec<Permission>> {
        self.user_store.resolve_user_permissions(user_id)
    }

    pub fn get_user_roles(&self, user_id: usize) -> Result<Vec<UserRole>> {
        self.user_store.get_user_roles(user_id)
    }

    pub fn add_user_role(&self, user_id: usize, role: UserRole) -> Result<()> {
        if self.user_store.get_user_handle(user_id)?.is_none() {
            bail!("User {} not found.", user_id);
        }
        self.user_store.add_user_role(user_id, role)
    }

    pub fn remove_user_role(&self, user_id: usize, role: UserRole) -> Result<()> {
        self.user_store.remove_user_role(user_id, role)
    }

    pub fn add_user_extra_permission(
        &self,
        user_id: usize,
        grant: PermissionGrant,
    ) -> Result<usize> {
        self.user_store.add_user_extra_permission(user_id, grant)
    }

    pub fn remove_user_extra_permission(&self, permission_id: usize) -> Result<()> {
        self.user_store.remove_user_extra_permission(permission_id)
    }

    pub fn get_candidate_profile(&self, user_id: usize) -> Result<Option<CandidateProfile>> {
        self.user_store.get_candidate_profile(user_id)
    }

    pub fn update_candidate_profile(&self, profile: CandidateProfile) -> Result<()> {
        if profile.full_name.trim().is_empty() {
            bail!("The profile full name cannot be empty.");
        }
        if profile.skills.len() > MAX_PROFILE_SKILLS {
            bail!(
                "Too many skills listed, the maximum is {} (attempted: {}).",
                MAX_PROFILE_SKILLS,
                profile.skills.len()
            );
        }
        self.user_store.upsert_candidate_profile(&profile)
    }

    pub fn set_saved_job(&self, user_id: usize, job_id: &str, saved: bool) -> Result<()> {
        if saved && self.board_store.get_job(job_id)?.is_none() {
            bail!("Job with id {} does not exist.", job_id);
        }
        self.user_store.set_saved_job(user_id, job_id, saved)
    }

    pub fn get_saved_jobs(&self, user_id: usize) -> Result<Vec<String>> {
        self.user_store.get_saved_jobs(user_id)
    }

    pub fn set_company_follow(
        &self,
        user_id: usize,
        company_id: &str,
        following: bool,
    ) -> Result<()> {
        if following && self.board_store.get_company(company_id)?.is_none() {
            bail!("Company with id {} does not exist.", company_id);
        }
        self.user_store
            .set_company_follow(user_id, company_id, following)
    }

    pub fn get_followed_companies(&self, user_id: usize) -> Result<Vec<String>> {
        self.user_store.get_followed_companies(user_id)
    }
}
