use serde::{Deserialize, Serialize};
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    BrowseBoard,
    ApplyToJobs,
    SaveAndFollow,
    CommentAndReview,
    PostJobs,
    ReviewApplications,
    ModerateContent,
    ManageUsers,
    ViewAnalytics,
    ServerAdmin,
}

impl Permission {
    pub fn as_int(self) -> i32 {
        match self {
            Permission::BrowseBoard => 1,
            Permission::ApplyToJobs => 2,
            Permission::SaveAndFollow => 3,
            Permission::CommentAndReview => 4,
            Permission::PostJobs => 5,
            Permission::ReviewApplications => 6,
            Permission::ModerateContent => 7,
            Permission::ManageUsers => 8,
            Permission::ViewAnalytics => 9,
            Permission::ServerAdmin => 10,
        }
    }

    pub fn from_int(value: i32) -> Option<Self> {
        match value {
            1 => Some(Permission::BrowseBoard),
            2 => Some(Permission::ApplyToJobs),
            3 => Some(Permission::SaveAndFollow),
            4 => Some(Permission::CommentAndReview),
            5 => Some(Permission::PostJobs),
            6 => Some(Permission::ReviewApplications),
            7 => Some(Permission::ModerateContent),
            8 => Some(Permission::ManageUsers),
            9 => Some(Permission::ViewAnalytics),
            10 => Some(Permission::ServerAdmin),
            _ => None,
        }
    }
}

const CANDIDATE_PERMISSIONS: &[Permission] = &[
    Permission::BrowseBoard,
    Permission::ApplyToJobs,
    Permission::SaveAndFollow,
    Permission::CommentAndReview,
];
const EMPLOYER_PERMISSIONS: &[Permission] = &[
    Permission::BrowseBoard,
    Permission::PostJobs,
    Permission::ReviewApplications,
    Permission::CommentAndReview,
];
const ADMIN_PERMISSIONS: &[Permission] = &[
    Permission::BrowseBoard,
    Permission::PostJobs,
    Permission::ReviewApplications,
    Permission::ModerateContent,
    Permission::ManageUsers,
    Permission::ViewAnalytics,
    Permission::ServerAdmin,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Candidate,
    Employer,
    Admin,
}

impl UserRole {
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            UserRole::Candidate => CANDIDATE_PERMISSIONS,
            UserRole::Employer => EMPLOYER_PERMISSIONS,
            UserRole::Admin => ADMIN_PERMISSIONS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Candidate => "Candidate",
            UserRole::Employer => "Employer",
            UserRole::Admin => "Admin",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "candidate" => Some(UserRole::Candidate),
            "employer" => Some(UserRole::Employer),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum PermissionGrant {
    ByRole(UserRole),
    Extra {
        start_time: SystemTime,
        end_time: Option<SystemTime>,
        permission: Permission,
        countdown: Option<u64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_int_roundtrip() {
        let permissions = [
            Permission::BrowseBoard,
            Permission::ApplyToJobs,
            Permission::SaveAndFollow,
            Permission::CommentAndReview,
            Permission::PostJobs,
            Permission::ReviewApplications,
            Permission::ModerateContent,
            Permission::ManageUsers,
            Permission::ViewAnalytics,
            Permission::ServerAdmin,
        ];
        for permission in &permissions {
            assert_eq!(Permission::from_int(permission.as_int()), Some(*permission));
        }
    }

    #[test]
    fn permission_from_int_invalid_values() {
        assert_eq!(Permission::from_int(0), None);
        assert_eq!(Permission::from_int(11), None);
        assert_eq!(Permission::from_int(-1), None);
        assert_eq!(Permission::from_int(i32::MAX), None);
    }

    #[test]
    fn candidate_permissions() {
        let perms = UserRole::Candidate.permissions();
        assert!(perms.contains(&Permission::BrowseBoard));
        assert!(perms.contains(&Permission::ApplyToJobs));
        assert!(perms.contains(&Permission::SaveAndFollow));
        assert!(!perms.contains(&Permission::PostJobs));
        assert!(!perms.contains(&Permission::ReviewApplications));
        assert!(!perms.contains(&Permission::ModerateContent));
    }

    #[test]
    fn employer_permissions() {
        let perms = UserRole::Employer.permissions();
        assert!(perms.contains(&Permission::PostJobs));
        assert!(perms.contains(&Permission::ReviewApplications));
        assert!(!perms.contains(&Permission::ApplyToJobs));
        assert!(!perms.contains(&Permission::ManageUsers));
    }

    #[test]
    fn admin_permissions() {
        let perms = UserRole::Admin.permissions();
        assert!(perms.contains(&Permission::ModerateContent));
        assert!(perms.contains(&Permission::ManageUsers));
        assert!(perms.contains(&Permission::ViewAnalytics));
        assert!(perms.contains(&Permission::ServerAdmin));
        assert!(!perms.contains(&Permission::ApplyToJobs));
    }

    #[test]
    fn role_str_roundtrip_case_insensitive() {
        for role in [UserRole::Candidate, UserRole::Employer, UserRole::Admin] {
            assert_eq!(UserRole::from_str(role.as_str()), Some(role));
            assert_eq!(UserRole::from_str(&role.as_str().to_uppercase()), Some(role));
        }
        assert_eq!(UserRole::from_str("recruiter"), None);
        assert_eq!(UserRole::from_str(""), None);
    }
}
