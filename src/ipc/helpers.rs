use rusqlite::Connection;
use serde_json::json;

use crate::auth::Role;
use crate::db;
use crate::ipc::error::err;
use crate::ipc::types::{AppState, Request};
use crate::store::{Diary, StoreError};

pub struct Open<'a> {
    pub diary: &'a mut Diary,
    pub conn: &'a Connection,
}

/// Content methods need a selected workspace; before that the store does not
/// exist.
pub fn open_state<'a>(
    state: &'a mut AppState,
    req_id: &str,
) -> Result<Open<'a>, serde_json::Value> {
    match (state.diary.as_mut(), state.db.as_ref()) {
        (Some(diary), Some(conn)) => Ok(Open { diary, conn }),
        _ => Err(err(req_id, "no_workspace", "select a workspace first", None)),
    }
}

/// Mutations additionally need a logged-in caller; the store re-checks the
/// role policy itself after this.
pub fn require_role(state: &AppState, req_id: &str) -> Result<Role, serde_json::Value> {
    state
        .session
        .role()
        .ok_or_else(|| err(req_id, "not_authenticated", "log in first", None))
}

pub fn store_err(req_id: &str, e: StoreError) -> serde_json::Value {
    let code = match e {
        StoreError::Forbidden => "forbidden",
        StoreError::InvalidGrade(_) => "invalid_grade",
    };
    err(req_id, code, e.to_string(), None)
}

/// Write-through after a mutation. A failed write is logged, not surfaced:
/// the in-memory state stays authoritative and the next successful write
/// repairs the slot.
pub fn persist(diary: &Diary, conn: &Connection) {
    if let Err(e) = db::snapshot_set_json(conn, db::SNAPSHOT_KEY, &diary.to_value()) {
        log::warn!("snapshot write failed: {e:#}");
    }
}

pub fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    let value = match req.params.get(key).and_then(|v| v.as_str()) {
        Some(v) => v.trim().to_string(),
        None => {
            return Err(err(
                &req.id,
                "bad_params",
                format!("missing params.{}", key),
                None,
            ))
        }
    };
    if value.is_empty() {
        return Err(err(
            &req.id,
            "bad_params",
            format!("{} must not be empty", key),
            None,
        ));
    }
    Ok(value)
}

pub fn required_i64(req: &Request, key: &str) -> Result<i64, serde_json::Value> {
    req.params.get(key).and_then(|v| v.as_i64()).ok_or_else(|| {
        err(
            &req.id,
            "bad_params",
            format!("missing params.{}", key),
            Some(json!({ "expected": "integer" })),
        )
    })
}
