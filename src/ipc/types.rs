use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

use crate::auth::{CredentialProvider, Session};
use crate::config::Cfg;
use crate::store::Diary;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub cfg: Cfg,
    pub provider: Box<dyn CredentialProvider>,
    pub session: Session,
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    pub diary: Option<Diary>,
}

impl AppState {
    pub fn new(cfg: Cfg, provider: Box<dyn CredentialProvider>) -> Self {
        Self {
            cfg,
            provider,
            session: Session::new(),
            workspace: None,
            db: None,
            diary: None,
        }
    }
}
