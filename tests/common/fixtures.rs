//! Test database fixtures
//!
//! Builds isolated board and user databases in a temp directory, with one
//! candidate, one employer and one admin account provisioned.

use super::constants::*;
use anyhow::Result;
use lavoro_server::user::{SqliteUserStore, UserManager, UserRole};
use lavoro_server::NullBoardStore;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

pub struct TestDatabases {
    pub temp_dir: TempDir,
    pub board_db_path: PathBuf,
    pub user_db_path: PathBuf,
}

pub fn create_test_databases() -> Result<TestDatabases> {
    let temp_dir = TempDir::new()?;
    let board_db_path = temp_dir.path().join("board.db");
    let user_db_path = temp_dir.path().join("user.db");

    let user_store = Arc::new(SqliteUserStore::new(&user_db_path)?);
    let user_manager = UserManager::new(Arc::new(NullBoardStore), user_store);

    user_manager.register_user(TEST_CANDIDATE, CANDIDATE_PASS.to_string(), UserRole::Candidate)?;
    user_manager.register_user(TEST_EMPLOYER, EMPLOYER_PASS.to_string(), UserRole::Employer)?;

    // Admin is provisioned directly, registration refuses the role
    let admin_id = user_manager.add_user(ADMIN_USER)?;
    user_manager.create_password_credentials(ADMIN_USER, ADMIN_PASS.to_string())?;
    user_manager.add_user_role(admin_id, UserRole::Admin)?;

    Ok(TestDatabases {
        temp_dir,
        board_db_path,
        user_db_path,
    })
}
