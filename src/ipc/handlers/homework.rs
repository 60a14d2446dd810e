use crate::ipc::error::ok;
use crate::ipc::helpers::{open_state, persist, require_role, required_i64, required_str, store_err};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let open = match open_state(state, &req.id) {
        Ok(o) => o,
        Err(resp) => return resp,
    };
    let homeworks = serde_json::to_value(&open.diary.homeworks).unwrap_or_else(|_| json!([]));
    ok(&req.id, json!({ "homeworks": homeworks }))
}

fn handle_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let role = match require_role(state, &req.id) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    let subject = match required_str(req, "subject") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let task = match required_str(req, "task") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let deadline = match required_str(req, "deadline") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let open = match open_state(state, &req.id) {
        Ok(o) => o,
        Err(resp) => return resp,
    };

    let homework = match open.diary.add_homework(role, &subject, &task, &deadline) {
        Ok(hw) => serde_json::to_value(hw).unwrap_or_default(),
        Err(e) => return store_err(&req.id, e),
    };
    persist(open.diary, open.conn);
    ok(&req.id, json!({ "homework": homework }))
}

fn handle_toggle(state: &mut AppState, req: &Request) -> serde_json::Value {
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

    match open.diary.toggle_homework(role, id) {
        Ok(Some(completed)) => {
            persist(open.diary, open.conn);
            ok(&req.id, json!({ "found": true, "completed": completed }))
        }
        // Absence is a valid, silent outcome.
        Ok(None) => ok(&req.id, json!({ "found": false, "completed": null })),
        Err(e) => store_err(&req.id, e),
    }
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

    match open.diary.delete_homework(role, id) {
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
        "homework.list" => Some(handle_list(state, req)),
        "homework.add" => Some(handle_add(state, req)),
        "homework.toggle" => Some(handle_toggle(state, req)),
        "homework.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
