use crate::notifications::{Notification, NotificationKind, NotificationStore};
use crate::sqlite_column;
use crate::sqlite_persistence::{
    open_versioned_database, Column, ForeignKey, ForeignKeyAction, SqlType, Table, VersionedSchema,
    DEFAULT_TIMESTAMP,
};
use crate::user::*;
use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::{
    path::{Path, PathBuf},
    str::FromStr,
    sync::{Arc, Mutex},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use super::auth::CredentialHasher;

/// V 0
const USER_TABLE_V_0: Table = Table {
    name: "user",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_unique = true
        ),
        sqlite_column!("handle", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[],
    indices: &[("idx_user_handle", "handle")],
};

const USER_PASSWORD_CREDENTIALS_TABLE_V_0: Table = Table {
    name: "user_password_credentials",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: ForeignKeyAction::Cascade,
            })
        ),
        sqlite_column!("salt", &SqlType::Text, non_null = true),
        sqlite_column!("hash", &SqlType::Text, non_null = true),
        sqlite_column!("hasher", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("last_tried", &SqlType::Integer),
        sqlite_column!("last_used", &SqlType::Integer),
    ],
    unique_constraints: &[],
    indices: &[],
};

const AUTH_TOKEN_TABLE_V_0: Table = Table {
    name: "auth_token",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: ForeignKeyAction::Cascade,
            })
        ),
        sqlite_column!("value", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("last_used", &SqlType::Integer),
    ],
    unique_constraints: &[],
    indices: &[("idx_auth_token_value", "value")],
};

const USER_ROLE_TABLE_V_0: Table = Table {
    name: "user_role",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: ForeignKeyAction::Cascade,
            })
        ),
        sqlite_column!("role", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[&["user_id", "role"]],
    indices: &[],
};

const USER_EXTRA_PERMISSION_TABLE_V_0: Table = Table {
    name: "user_extra_permission",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_unique = true
        ),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: ForeignKeyAction::Cascade,
            })
        ),
        sqlite_column!("permission", &SqlType::Integer, non_null = true),
        sqlite_column!("start_time", &SqlType::Integer, non_null = true),
        sqlite_column!("end_time", &SqlType::Integer),
        sqlite_column!("countdown", &SqlType::Integer),
    ],
    unique_constraints: &[],
    indices: &[],
};

const CANDIDATE_PROFILE_TABLE_V_0: Table = Table {
    name: "candidate_profile",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            is_primary_key = true,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: ForeignKeyAction::Cascade,
            })
        ),
        sqlite_column!("full_name", &SqlType::Text, non_null = true),
        sqlite_column!("headline", &SqlType::Text),
        sqlite_column!("summary", &SqlType::Text),
        sqlite_column!("location", &SqlType::Text),
        sqlite_column!("years_experience", &SqlType::Integer),
        sqlite_column!("skills", &SqlType::Text, non_null = true),
        sqlite_column!(
            "updated",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[],
    indices: &[],
};

const SAVED_JOB_TABLE_V_0: Table = Table {
    name: "saved_job",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            non_null = true,
            is_unique = true
        ),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: ForeignKeyAction::Cascade,
            })
        ),
        sqlite_column!("job_id", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[&["user_id", "job_id"]],
    indices: &[],
};

const COMPANY_FOLLOW_TABLE_V_0: Table = Table {
    name: "company_follow",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            non_null = true,
            is_unique = true
        ),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: ForeignKeyAction::Cascade,
            })
        ),
        sqlite_column!("company_id", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[&["user_id", "company_id"]],
    indices: &[("idx_company_follow_company", "company_id")],
};

/// V 1
const NOTIFICATION_TABLE_V_1: Table = Table {
    name: "notification",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Text,
            is_primary_key = true,
            non_null = true,
            is_unique = true
        ),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: ForeignKeyAction::Cascade,
            })
        ),
        sqlite_column!("kind", &SqlType::Text, non_null = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("body", &SqlType::Text),
        sqlite_column!("data", &SqlType::Text, non_null = true),
        sqlite_column!("read_at", &SqlType::Integer),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[],
    indices: &[("idx_notification_user", "user_id")],
};

const VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 0,
        tables: &[
            USER_TABLE_V_0,
            USER_PASSWORD_CREDENTIALS_TABLE_V_0,
            AUTH_TOKEN_TABLE_V_0,
            USER_ROLE_TABLE_V_0,
            USER_EXTRA_PERMISSION_TABLE_V_0,
            CANDIDATE_PROFILE_TABLE_V_0,
            SAVED_JOB_TABLE_V_0,
            COMPANY_FOLLOW_TABLE_V_0,
        ],
        migration: None,
    },
    VersionedSchema {
        version: 1,
        tables: &[
            USER_TABLE_V_0,
            USER_PASSWORD_CREDENTIALS_TABLE_V_0,
            AUTH_TOKEN_TABLE_V_0,
            USER_ROLE_TABLE_V_0,
            USER_EXTRA_PERMISSION_TABLE_V_0,
            CANDIDATE_PROFILE_TABLE_V_0,
            SAVED_JOB_TABLE_V_0,
            COMPANY_FOLLOW_TABLE_V_0,
            NOTIFICATION_TABLE_V_1,
        ],
        migration: Some(|conn: &Connection| {
            NOTIFICATION_TABLE_V_1.create(conn)?;
            Ok(())
        }),
    },
];

fn now_ts() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn ts_to_system_time(ts: i64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(ts.max(0) as u64)
}

fn system_time_to_ts(t: SystemTime) -> i64 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[derive(Clone)]
pub struct SqliteUserStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteUserStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let conn = open_versioned_database(db_path, VERSIONED_SCHEMAS)?;
        Ok(SqliteUserStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Looks for a `user.db` next to the working directory or in the
    /// conventional data location, for the CLI binary.
    pub fn infer_path() -> Option<PathBuf> {
        let db_data_path = PathBuf::from("/data/db/user.db");
        if db_data_path.exists() {
            return Some(db_data_path);
        }

        let mut current_dir = std::env::current_dir().ok()?;
        loop {
            let candidate = current_dir.join("user.db");
            if candidate.is_file() {
                return Some(candidate);
            }
            if let Some(parent) = current_dir.parent() {
                current_dir = parent.to_path_buf();
            } else {
                break;
            }
        }

        None
    }
}

impl UserStore for SqliteUserStore {
    fn create_user(&self, user_handle: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO user (handle) VALUES (?1)",
            params![user_handle],
        )
        .with_context(|| format!("Failed to create user {}", user_handle))?;
        Ok(conn.last_insert_rowid() as usize)
    }

    fn get_user_handle(&self, user_id: usize) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let handle = conn
            .query_row(
                "SELECT handle FROM user WHERE id = ?1",
                params![user_id as i64],
                |row| row.get(0),
            )
            .optional()?;
        Ok(handle)
    }

    fn get_user_id(&self, user_handle: &str) -> Result<Option<usize>> {
        let conn = self.conn.lock().unwrap();
        let id: Option<i64> = conn
            .query_row(
                "SELECT id FROM user WHERE handle = ?1",
                params![user_handle],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id.map(|id| id as usize))
    }

    fn get_all_user_handles(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT handle FROM user ORDER BY id")?;
        let handles = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(handles)
    }

    fn get_all_users(&self) -> Result<Vec<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT id, handle, created FROM user ORDER BY id")?;
        let users = stmt
            .query_map([], |row| {
                Ok(User {
                    id: row.get::<_, i64>(0)? as usize,
                    handle: row.get(1)?,
                    created: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    fn get_user_roles(&self, user_id: usize) -> Result<Vec<UserRole>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT role FROM user_role WHERE user_id = ?1")?;
        let role_names = stmt
            .query_map(params![user_id as i64], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut roles = Vec::with_capacity(role_names.len());
        for name in role_names {
            match UserRole::from_str(&name) {
                Some(role) => roles.push(role),
                None => bail!("Unknown role '{}' stored for user {}", name, user_id),
            }
        }
        Ok(roles)
    }

    fn add_user_role(&self, user_id: usize, role: UserRole) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO user_role (user_id, role) VALUES (?1, ?2)",
            params![user_id as i64, role.as_str()],
        )?;
        Ok(())
    }

    fn remove_user_role(&self, user_id: usize, role: UserRole) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM user_role WHERE user_id = ?1 AND role = ?2",
            params![user_id as i64, role.as_str()],
        )?;
        Ok(())
    }

    fn add_user_extra_permission(&self, user_id: usize, grant: PermissionGrant) -> Result<usize> {
        let (start_time, end_time, permission, countdown) = match grant {
            PermissionGrant::ByRole(_) => {
                bail!("Role grants are stored in user_role, not as extra permissions")
            }
            PermissionGrant::Extra {
                start_time,
                end_time,
                permission,
                countdown,
            } => (start_time, end_time, permission, countdown),
        };

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO user_extra_permission (user_id, permission, start_time, end_time, countdown)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user_id as i64,
                permission.as_int(),
                system_time_to_ts(start_time),
                end_time.map(system_time_to_ts),
                countdown.map(|c| c as i64),
            ],
        )?;
        Ok(conn.last_insert_rowid() as usize)
    }

    fn remove_user_extra_permission(&self, permission_id: usize) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM user_extra_permission WHERE id = ?1",
            params![permission_id as i64],
        )?;
        Ok(())
    }

    fn decrement_permission_countdown(&self, permission_id: usize) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE user_extra_permission
             SET countdown = countdown - 1
             WHERE id = ?1 AND countdown IS NOT NULL AND countdown > 0",
            params![permission_id as i64],
        )?;
        let remaining: Option<i64> = conn
            .query_row(
                "SELECT countdown FROM user_extra_permission WHERE id = ?1",
                params![permission_id as i64],
                |row| row.get(0),
            )
            .optional()?
            .flatten();
        Ok(remaining.map(|c| c > 0).unwrap_or(false))
    }

    fn resolve_user_permissions(&self, user_id: usize) -> Result<Vec<Permission>> {
        let mut permissions: Vec<Permission> = Vec::new();
        for role in self.get_user_roles(user_id)? {
            for permission in role.permissions() {
                if !permissions.contains(permission) {
                    permissions.push(*permission);
                }
            }
        }

        let now = now_ts();
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT permission FROM user_extra_permission
             WHERE user_id = ?1
               AND start_time <= ?2
               AND (end_time IS NULL OR end_time > ?2)
               AND (countdown IS NULL OR countdown > 0)",
        )?;
        let extra = stmt
            .query_map(params![user_id as i64, now], |row| row.get::<_, i32>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        for value in extra {
            if let Some(permission) = Permission::from_int(value) {
                if !permissions.contains(&permission) {
                    permissions.push(permission);
                }
            }
        }

        Ok(permissions)
    }
}

impl UserAuthCredentialsStore for SqliteUserStore {
    fn get_user_auth_credentials(&self, user_handle: &str) -> Result<Option<UserAuthCredentials>> {
        let user_id = match self.get_user_id(user_handle)? {
            Some(id) => id,
            None => return Ok(None),
        };

        let conn = self.conn.lock().unwrap();
        let username_password = conn
            .query_row(
                "SELECT salt, hash, hasher, created, last_tried, last_used
                 FROM user_password_credentials WHERE user_id = ?1",
                params![user_id as i64],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, Option<i64>>(4)?,
                        row.get::<_, Option<i64>>(5)?,
                    ))
                },
            )
            .optional()?;

        let username_password = match username_password {
            None => None,
            Some((salt, hash, hasher, created, last_tried, last_used)) => {
                Some(UsernamePasswordCredentials {
                    user_id,
                    salt,
                    hash,
                    hasher: CredentialHasher::from_str(&hasher)?,
                    created: ts_to_system_time(created),
                    last_tried: last_tried.map(ts_to_system_time),
                    last_used: last_used.map(ts_to_system_time),
                })
            }
        };

        Ok(Some(UserAuthCredentials {
            user_id,
            username_password,
        }))
    }

    fn update_user_auth_credentials(&self, credentials: UserAuthCredentials) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM user_password_credentials WHERE user_id = ?1",
            params![credentials.user_id as i64],
        )?;
        if let Some(pw) = credentials.username_password {
            conn.execute(
                "INSERT INTO user_password_credentials
                 (user_id, salt, hash, hasher, created, last_tried, last_used)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    credentials.user_id as i64,
                    pw.salt,
                    pw.hash,
                    pw.hasher.to_string(),
                    system_time_to_ts(pw.created),
                    pw.last_tried.map(system_time_to_ts),
                    pw.last_used.map(system_time_to_ts),
                ],
            )?;
        }
        Ok(())
    }
}

impl UserAuthTokenStore for SqliteUserStore {
    fn get_user_auth_token(&self, token: &AuthTokenValue) -> Result<Option<AuthToken>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT user_id, created, last_used FROM auth_token WHERE value = ?1",
                params![token.0],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, Option<i64>>(2)?,
                    ))
                },
            )
            .optional()?;
        Ok(row.map(|(user_id, created, last_used)| AuthToken {
            user_id: user_id as usize,
            created: ts_to_system_time(created),
            last_used: last_used.map(ts_to_system_time),
            value: token.clone(),
        }))
    }

    fn delete_user_auth_token(&self, token: &AuthTokenValue) -> Result<Option<AuthToken>> {
        let existing = self.get_user_auth_token(token)?;
        if existing.is_some() {
            let conn = self.conn.lock().unwrap();
            conn.execute(
                "DELETE FROM auth_token WHERE value = ?1",
                params![token.0],
            )?;
        }
        Ok(existing)
    }

    fn update_user_auth_token_last_used_timestamp(&self, token: &AuthTokenValue) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE auth_token SET last_used = ?1 WHERE value = ?2",
            params![now_ts(), token.0],
        )?;
        Ok(())
    }

    fn add_user_auth_token(&self, token: AuthToken) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO auth_token (user_id, value, created, last_used) VALUES (?1, ?2, ?3, ?4)",
            params![
                token.user_id as i64,
                token.value.0,
                system_time_to_ts(token.created),
                token.last_used.map(system_time_to_ts),
            ],
        )?;
        Ok(())
    }

    fn get_all_user_auth_tokens(&self, user_handle: &str) -> Result<Vec<AuthToken>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT t.user_id, t.value, t.created, t.last_used
             FROM auth_token t JOIN user u ON u.id = t.user_id
             WHERE u.handle = ?1",
        )?;
        let tokens = stmt
            .query_map(params![user_handle], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, Option<i64>>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|(user_id, value, created, last_used)| AuthToken {
                user_id: user_id as usize,
                created: ts_to_system_time(created),
                last_used: last_used.map(ts_to_system_time),
                value: AuthTokenValue(value),
            })
            .collect();
        Ok(tokens)
    }

    fn prune_unused_auth_tokens(&self, unused_for_days: u64) -> Result<usize> {
        let cutoff = now_ts() - (unused_for_days as i64 * 24 * 60 * 60);
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            "DELETE FROM auth_token WHERE COALESCE(last_used, created) < ?1",
            params![cutoff],
        )?;
        Ok(deleted)
    }
}

impl UserContentStore for SqliteUserStore {
    fn set_saved_job(&self, user_id: usize, job_id: &str, saved: bool) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        if saved {
            conn.execute(
                "INSERT OR IGNORE INTO saved_job (user_id, job_id) VALUES (?1, ?2)",
                params![user_id as i64, job_id],
            )?;
        } else {
            conn.execute(
                "DELETE FROM saved_job WHERE user_id = ?1 AND job_id = ?2",
                params![user_id as i64, job_id],
            )?;
        }
        Ok(())
    }

    fn is_job_saved(&self, user_id: usize, job_id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM saved_job WHERE user_id = ?1 AND job_id = ?2",
            params![user_id as i64, job_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn get_saved_jobs(&self, user_id: usize) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT job_id FROM saved_job WHERE user_id = ?1 ORDER BY created DESC, id DESC",
        )?;
        let job_ids = stmt
            .query_map(params![user_id as i64], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(job_ids)
    }

    fn set_company_follow(&self, user_id: usize, company_id: &str, following: bool) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        if following {
            conn.execute(
                "INSERT OR IGNORE INTO company_follow (user_id, company_id) VALUES (?1, ?2)",
                params![user_id as i64, company_id],
            )?;
        } else {
            conn.execute(
                "DELETE FROM company_follow WHERE user_id = ?1 AND company_id = ?2",
                params![user_id as i64, company_id],
            )?;
        }
        Ok(())
    }

    fn is_following_company(&self, user_id: usize, company_id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM company_follow WHERE user_id = ?1 AND company_id = ?2",
            params![user_id as i64, company_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn get_followed_companies(&self, user_id: usize) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT company_id FROM company_follow WHERE user_id = ?1 ORDER BY created DESC, id DESC",
        )?;
        let company_ids = stmt
            .query_map(params![user_id as i64], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(company_ids)
    }

    fn get_company_followers(&self, company_id: &str) -> Result<Vec<usize>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT user_id FROM company_follow WHERE company_id = ?1")?;
        let user_ids = stmt
            .query_map(params![company_id], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|id| id as usize)
            .collect();
        Ok(user_ids)
    }

    fn get_candidate_profile(&self, user_id: usize) -> Result<Option<CandidateProfile>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT full_name, headline, summary, location, years_experience, skills, updated
                 FROM candidate_profile WHERE user_id = ?1",
                params![user_id as i64],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, Option<i64>>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, i64>(6)?,
                    ))
                },
            )
            .optional()?;

        let profile = match row {
            None => None,
            Some((full_name, headline, summary, location, years_experience, skills, updated)) => {
                Some(CandidateProfile {
                    user_id,
                    full_name,
                    headline,
                    summary,
                    location,
                    years_experience: years_experience.map(|y| y as u32),
                    skills: serde_json::from_str(&skills)
                        .context("Malformed skills payload in candidate_profile")?,
                    updated,
                })
            }
        };
        Ok(profile)
    }

    fn upsert_candidate_profile(&self, profile: &CandidateProfile) -> Result<()> {
        let skills = serde_json::to_string(&profile.skills)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO candidate_profile
             (user_id, full_name, headline, summary, location, years_experience, skills, updated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(user_id) DO UPDATE SET
               full_name = excluded.full_name,
               headline = excluded.headline,
               summary = excluded.summary,
               location = excluded.location,
               years_experience = excluded.years_experience,
               skills = excluded.skills,
               updated = excluded.updated",
            params![
                profile.user_id as i64,
                profile.full_name,
                profile.headline,
                profile.summary,
                profile.location,
                profile.years_experience.map(|y| y as i64),
                skills,
                now_ts(),
            ],
        )?;
        Ok(())
    }
}

impl NotificationStore for SqliteUserStore {
    fn create_notification(
        &self,
        user_id: usize,
        kind: NotificationKind,
        title: String,
        body: Option<String>,
        data: serde_json::Value,
    ) -> Result<Notification> {
        let id = uuid::Uuid::new_v4().to_string();
        let created_at = now_ts();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO notification (id, user_id, kind, title, body, data, created)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id,
                user_id as i64,
                kind.as_str(),
                title,
                body,
                serde_json::to_string(&data)?,
                created_at,
            ],
        )?;
        Ok(Notification {
            id,
            kind,
            title,
            body,
            data,
            read_at: None,
            created_at,
        })
    }

    fn get_user_notifications(
        &self,
        user_id: usize,
        unread_only: bool,
    ) -> Result<Vec<Notification>> {
        let conn = self.conn.lock().unwrap();
        let sql = if unread_only {
            "SELECT id, kind, title, body, data, read_at, created FROM notification
             WHERE user_id = ?1 AND read_at IS NULL ORDER BY created DESC, id DESC"
        } else {
            "SELECT id, kind, title, body, data, read_at, created FROM notification
             WHERE user_id = ?1 ORDER BY created DESC, id DESC"
        };
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params![user_id as i64], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, Option<i64>>(5)?,
                    row.get::<_, i64>(6)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut notifications = Vec::with_capacity(rows.len());
        for (id, kind, title, body, data, read_at, created_at) in rows {
            let kind = NotificationKind::from_str(&kind)
                .with_context(|| format!("Unknown notification kind '{}'", kind))?;
            notifications.push(Notification {
                id,
                kind,
                title,
                body,
                data: serde_json::from_str(&data)?,
                read_at,
                created_at,
            });
        }
        Ok(notifications)
    }

    fn count_unread_notifications(&self, user_id: usize) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM notification WHERE user_id = ?1 AND read_at IS NULL",
            params![user_id as i64],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn mark_notification_read(
        &self,
        user_id: usize,
        notification_id: &str,
    ) -> Result<Option<Notification>> {
        {
            let conn = self.conn.lock().unwrap();
            conn.execute(
                "UPDATE notification SET read_at = COALESCE(read_at, ?1)
                 WHERE id = ?2 AND user_id = ?3",
                params![now_ts(), notification_id, user_id as i64],
            )?;
        }
        let notification = self
            .get_user_notifications(user_id, false)?
            .into_iter()
            .find(|n| n.id == notification_id);
        Ok(notification)
    }

    fn mark_all_notifications_read(&self, user_id: usize) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE notification SET read_at = ?1 WHERE user_id = ?2 AND read_at IS NULL",
            params![now_ts(), user_id as i64],
        )?;
        Ok(updated)
    }

    fn prune_read_notifications(&self, cutoff: i64) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            "DELETE FROM notification WHERE read_at IS NOT NULL AND created < ?1",
            params![cutoff],
        )?;
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, SqliteUserStore) {
        let dir = TempDir::new().unwrap();
        let store = SqliteUserStore::new(dir.path().join("user.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn create_user_returns_increasing_ids() {
        let (_dir, store) = test_store();
        let first = store.create_user("alice").unwrap();
        let second = store.create_user("bob").unwrap();
        assert!(second > first);
        assert_eq!(store.get_user_handle(first).unwrap().unwrap(), "alice");
        assert_eq!(store.get_user_id("bob").unwrap().unwrap(), second);
    }

    #[test]
    fn duplicate_handle_is_rejected() {
        let (_dir, store) = test_store();
        store.create_user("alice").unwrap();
        assert!(store.create_user("alice").is_err());
    }

    #[test]
    fn roles_roundtrip_and_resolve() {
        let (_dir, store) = test_store();
        let user_id = store.create_user("carla").unwrap();

        store.add_user_role(user_id, UserRole::Candidate).unwrap();
        // Duplicate assignment is a no-op
        store.add_user_role(user_id, UserRole::Candidate).unwrap();
        assert_eq!(
            store.get_user_roles(user_id).unwrap(),
            vec![UserRole::Candidate]
        );

        let permissions = store.resolve_user_permissions(user_id).unwrap();
        assert!(permissions.contains(&Permission::ApplyToJobs));
        assert!(!permissions.contains(&Permission::PostJobs));

        store.remove_user_role(user_id, UserRole::Candidate).unwrap();
        assert!(store.get_user_roles(user_id).unwrap().is_empty());
    }

    #[test]
    fn extra_permission_grant_and_countdown() {
        let (_dir, store) = test_store();
        let user_id = store.create_user("dario").unwrap();

        let grant_id = store
            .add_user_extra_permission(
                user_id,
                PermissionGrant::Extra {
                    start_time: SystemTime::now() - Duration::from_secs(10),
                    end_time: None,
                    permission: Permission::ModerateContent,
                    countdown: Some(2),
                },
            )
            .unwrap();

        assert!(store
            .resolve_user_permissions(user_id)
            .unwrap()
            .contains(&Permission::ModerateContent));

        assert!(store.decrement_permission_countdown(grant_id).unwrap());
        assert!(!store.decrement_permission_countdown(grant_id).unwrap());
        assert!(!store
            .resolve_user_permissions(user_id)
            .unwrap()
            .contains(&Permission::ModerateContent));
    }

    #[test]
    fn expired_extra_permission_is_not_resolved() {
        let (_dir, store) = test_store();
        let user_id = store.create_user("elena").unwrap();

        store
            .add_user_extra_permission(
                user_id,
                PermissionGrant::Extra {
                    start_time: SystemTime::now() - Duration::from_secs(120),
                    end_time: Some(SystemTime::now() - Duration::from_secs(60)),
                    permission: Permission::ViewAnalytics,
                    countdown: None,
                },
            )
            .unwrap();

        assert!(store.resolve_user_permissions(user_id).unwrap().is_empty());
    }

    #[test]
    fn auth_token_lifecycle() {
        let (_dir, store) = test_store();
        let user_id = store.create_user("franco").unwrap();

        let token = AuthToken {
            user_id,
            created: SystemTime::now(),
            last_used: None,
            value: AuthTokenValue::generate(),
        };
        store.add_user_auth_token(token.clone()).unwrap();

        let loaded = store.get_user_auth_token(&token.value).unwrap().unwrap();
        assert_eq!(loaded.user_id, user_id);

        store
            .update_user_auth_token_last_used_timestamp(&token.value)
            .unwrap();
        let loaded = store.get_user_auth_token(&token.value).unwrap().unwrap();
        assert!(loaded.last_used.is_some());

        let deleted = store.delete_user_auth_token(&token.value).unwrap();
        assert!(deleted.is_some());
        assert!(store.get_user_auth_token(&token.value).unwrap().is_none());
    }

    #[test]
    fn saved_jobs_are_idempotent_and_ordered() {
        let (_dir, store) = test_store();
        let user_id = store.create_user("giulia").unwrap();

        store.set_saved_job(user_id, "job-a", true).unwrap();
        store.set_saved_job(user_id, "job-a", true).unwrap();
        store.set_saved_job(user_id, "job-b", true).unwrap();

        let saved = store.get_saved_jobs(user_id).unwrap();
        assert_eq!(saved.len(), 2);
        assert!(store.is_job_saved(user_id, "job-a").unwrap());

        store.set_saved_job(user_id, "job-a", false).unwrap();
        assert!(!store.is_job_saved(user_id, "job-a").unwrap());
        assert_eq!(store.get_saved_jobs(user_id).unwrap(), vec!["job-b"]);
    }

    #[test]
    fn follows_and_followers() {
        let (_dir, store) = test_store();
        let user_a = store.create_user("anna").unwrap();
        let user_b = store.create_user("bruno").unwrap();

        store.set_company_follow(user_a, "company-x", true).unwrap();
        store.set_company_follow(user_b, "company-x", true).unwrap();
        store.set_company_follow(user_a, "company-y", true).unwrap();

        let mut followers = store.get_company_followers("company-x").unwrap();
        followers.sort_unstable();
        assert_eq!(followers, vec![user_a, user_b]);

        store.set_company_follow(user_b, "company-x", false).unwrap();
        assert_eq!(store.get_company_followers("company-x").unwrap(), vec![user_a]);
        assert!(store.is_following_company(user_a, "company-y").unwrap());
    }

    #[test]
    fn candidate_profile_upsert() {
        let (_dir, store) = test_store();
        let user_id = store.create_user("ines").unwrap();

        assert!(store.get_candidate_profile(user_id).unwrap().is_none());

        let mut profile = CandidateProfile {
            user_id,
            full_name: "Ines Rossi".to_string(),
            headline: Some("Backend engineer".to_string()),
            summary: None,
            location: Some("Milano".to_string()),
            years_experience: Some(6),
            skills: vec!["rust".to_string()],
            updated: 0,
        };
        store.upsert_candidate_profile(&profile).unwrap();

        let loaded = store.get_candidate_profile(user_id).unwrap().unwrap();
        assert_eq!(loaded.full_name, "Ines Rossi");
        assert_eq!(loaded.skills, vec!["rust"]);

        profile.skills.push("sqlite".to_string());
        profile.headline = None;
        store.upsert_candidate_profile(&profile).unwrap();

        let loaded = store.get_candidate_profile(user_id).unwrap().unwrap();
        assert_eq!(loaded.skills.len(), 2);
        assert!(loaded.headline.is_none());
    }

    #[test]
    fn notification_mark_read_is_idempotent() {
        let (_dir, store) = test_store();
        let user_id = store.create_user("luca").unwrap();

        let notification = store
            .create_notification(
                user_id,
                NotificationKind::JobPublished,
                "New job".to_string(),
                None,
                serde_json::json!({"job_id": "job-1"}),
            )
            .unwrap();

        assert_eq!(store.count_unread_notifications(user_id).unwrap(), 1);

        let first = store
            .mark_notification_read(user_id, &notification.id)
            .unwrap()
            .unwrap();
        let first_read_at = first.read_at.unwrap();

        let second = store
            .mark_notification_read(user_id, &notification.id)
            .unwrap()
            .unwrap();
        assert_eq!(second.read_at.unwrap(), first_read_at);
        assert_eq!(store.count_unread_notifications(user_id).unwrap(), 0);
    }

    #[test]
    fn notifications_are_scoped_per_user() {
        let (_dir, store) = test_store();
        let user_a = store.create_user("marta").unwrap();
        let user_b = store.create_user("nino").unwrap();

        let notification = store
            .create_notification(
                user_a,
                NotificationKind::ApplicationReceived,
                "New application".to_string(),
                None,
                serde_json::Value::Null,
            )
            .unwrap();

        // user_b cannot mark user_a's notification
        assert!(store
            .mark_notification_read(user_b, &notification.id)
            .unwrap()
            .is_none());
        assert_eq!(store.count_unread_notifications(user_a).unwrap(), 1);
        assert!(store.get_user_notifications(user_b, false).unwrap().is_empty());
    }

    #[test]
    fn prune_only_touches_read_notifications() {
        let (_dir, store) = test_store();
        let user_id = store.create_user("olga").unwrap();

        let read = store
            .create_notification(
                user_id,
                NotificationKind::JobPublished,
                "old".to_string(),
                None,
                serde_json::Value::Null,
            )
            .unwrap();
        store.mark_notification_read(user_id, &read.id).unwrap();
        store
            .create_notification(
                user_id,
                NotificationKind::JobPublished,
                "unread".to_string(),
                None,
                serde_json::Value::Null,
            )
            .unwrap();

        // Cutoff in the future: the read one goes, the unread one stays.
        let deleted = store.prune_read_notifications(now_ts() + 10).unwrap();
        assert_eq!(deleted, 1);
        let remaining = store.get_user_notifications(user_id, false).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].title, "unread");
    }
}
