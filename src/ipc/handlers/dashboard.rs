use crate::ipc::error::ok;
use crate::ipc::helpers::{open_state, persist, require_role};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    let open = match open_state(state, &req.id) {
        Ok(o) => o,
        Err(resp) => return resp,
    };
    let summary = serde_json::to_value(open.diary.summary()).unwrap_or_else(|_| json!({}));
    ok(&req.id, summary)
}

fn handle_notifications_read(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_role(state, &req.id) {
        return resp;
    }
    let open = match open_state(state, &req.id) {
        Ok(o) => o,
        Err(resp) => return resp,
    };
    let notifications = open.diary.read_notifications();
    persist(open.diary, open.conn);
    ok(&req.id, json!({ "notifications": notifications }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "dashboard.summary" => Some(handle_summary(state, req)),
        "notifications.read" => Some(handle_notifications_read(state, req)),
        _ => None,
    }
}
