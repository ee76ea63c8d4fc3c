use axum::extract::FromRef;

use crate::applications::ApplicationManager;
use crate::board::BoardManager;
use crate::user::{FullUserStore, UserManager};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use super::ServerConfig;

pub type GuardedUserManager = Arc<Mutex<UserManager>>;
pub type GuardedBoardManager = Arc<BoardManager>;
pub type GuardedApplicationManager = Arc<ApplicationManager>;
pub type GuardedUserStore = Arc<dyn FullUserStore>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub user_manager: GuardedUserManager,
    pub board_manager: GuardedBoardManager,
    pub application_manager: GuardedApplicationManager,
    pub user_store: GuardedUserStore,
    pub hash: String,
}

impl FromRef<ServerState> for GuardedUserManager {
    fn from_ref(input: &ServerState) -> Self {
        input.user_manager.clone()
    }
}

impl FromRef<ServerState> for GuardedBoardManager {
    fn from_ref(input: &ServerState) -> Self {
        input.board_manager.clone()
    }
}

impl FromRef<ServerState> for GuardedApplicationManager {
    fn from_ref(input: &ServerState) -> Self {
        input.application_manager.clone()
    }
}

impl FromRef<ServerState> for GuardedUserStore {
    fn from_ref(input: &ServerState) -> Self {
        input.user_store.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
