use crate::ipc::error::ok;
use crate::ipc::helpers::{open_state, persist, require_role, required_i64, required_str, store_err};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn grades_json(grades: &[crate::store::Grade]) -> serde_json::Value {
    serde_json::to_value(grades).unwrap_or_else(|_| json!([]))
}

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let open = match open_state(state, &req.id) {
        Ok(o) => o,
        Err(resp) => return resp,
    };
    // Serialize before the on-view policy clears the badges: the UI still
    // renders "new" once.
    let listed = grades_json(&open.diary.grades);
    if open.diary.grades_viewed() {
        persist(open.diary, open.conn);
    }
    ok(&req.id, json!({ "grades": listed }))
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
    let value = match required_i64(req, "value") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let open = match open_state(state, &req.id) {
        Ok(o) => o,
        Err(resp) => return resp,
    };

    let grade = match open.diary.add_grade(role, &subject, value) {
        Ok(g) => serde_json::to_value(g).unwrap_or_default(),
        Err(e) => return store_err(&req.id, e),
    };
    persist(open.diary, open.conn);
    ok(
        &req.id,
        json!({ "grade": grade, "notifications": open.diary.notifications }),
    )
}

fn handle_acknowledge(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_role(state, &req.id) {
        return resp;
    }
    let open = match open_state(state, &req.id) {
        Ok(o) => o,
        Err(resp) => return resp,
    };
    let acknowledged = open.diary.acknowledge_grades();
    if acknowledged {
        persist(open.diary, open.conn);
    }
    ok(&req.id, json!({ "acknowledged": acknowledged }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "grades.list" => Some(handle_list(state, req)),
        "grades.add" => Some(handle_add(state, req)),
        "grades.acknowledge" => Some(handle_acknowledge(state, req)),
        _ => None,
    }
}
