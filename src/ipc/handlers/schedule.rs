use crate::ipc::error::ok;
use crate::ipc::helpers::{open_state, persist, require_role, required_i64, required_str, store_err};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let open = match open_state(state, &req.id) {
        Ok(o) => o,
        Err(resp) => return resp,
    };
    let schedule = serde_json::to_value(&open.diary.schedule).unwrap_or_else(|_| json!([]));
    ok(&req.id, json!({ "schedule": schedule }))
}

fn handle_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let role = match require_role(state, &req.id) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    let time = match required_str(req, "time") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let subject = match required_str(req, "subject") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let teacher = match required_str(req, "teacher") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let room = match required_str(req, "room") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let open = match open_state(state, &req.id) {
        Ok(o) => o,
        Err(resp) => return resp,
    };

    let lesson = match open.diary.add_lesson(role, &time, &subject, &teacher, &room) {
        Ok(l) => serde_json::to_value(l).unwrap_or_default(),
        Err(e) => return store_err(&req.id, e),
    };
    persist(open.diary, open.conn);
    ok(&req.id, json!({ "lesson": lesson }))
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let role = match require_role(state, &req.id) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    let id = match required_i64(req, "id") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let open = match open_state(state, &req.id) {
        Ok(o) => o,
        Err(resp) => return resp,
    };

    match open.diary.delete_lesson(role, id) {
        Ok(removed) => {
            if removed {
                persist(open.diary, open.conn);
            }
            ok(&req.id, json!({ "removed": removed }))
        }
        Err(e) => store_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "schedule.list" => Some(handle_list(state, req)),
        "schedule.add" => Some(handle_add(state, req)),
        "schedule.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
