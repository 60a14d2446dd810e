use crate::ipc::error::ok;
use crate::ipc::helpers::{open_state, persist, require_role, required_i64, required_str, store_err};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_teachers_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let open = match open_state(state, &req.id) {
        Ok(o) => o,
        Err(resp) => return resp,
    };
    let teachers = serde_json::to_value(&open.diary.teachers).unwrap_or_else(|_| json!([]));
    ok(&req.id, json!({ "teachers": teachers }))
}

fn handle_teachers_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let role = match require_role(state, &req.id) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    let name = match required_str(req, "name") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let subject = match required_str(req, "subject") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let email = match required_str(req, "email") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let phone = match required_str(req, "phone") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let open = match open_state(state, &req.id) {
        Ok(o) => o,
        Err(resp) => return resp,
    };

    let teacher = match open.diary.add_teacher(role, &name, &subject, &email, &phone) {
        Ok(t) => serde_json::to_value(t).unwrap_or_default(),
        Err(e) => return store_err(&req.id, e),
    };
    persist(open.diary, open.conn);
    ok(&req.id, json!({ "teacher": teacher }))
}

fn handle_teachers_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
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

    match open.diary.delete_teacher(role, id) {
        Ok(removed) => {
            if removed {
                persist(open.diary, open.conn);
            }
            ok(&req.id, json!({ "removed": removed }))
        }
        Err(e) => store_err(&req.id, e),
    }
}

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let open = match open_state(state, &req.id) {
        Ok(o) => o,
        Err(resp) => return resp,
    };
    let students = serde_json::to_value(&open.diary.students).unwrap_or_else(|_| json!([]));
    ok(&req.id, json!({ "students": students }))
}

fn handle_students_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let role = match require_role(state, &req.id) {
        Ok(r) => r,
        Err(resp) => return resp,
    };
    let name = match required_str(req, "name") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let class_name = match required_str(req, "class") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let email = match required_str(req, "email") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let phone = match required_str(req, "phone") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let open = match open_state(state, &req.id) {
        Ok(o) => o,
        Err(resp) => return resp,
    };

    let student = match open.diary.add_student(role, &name, &class_name, &email, &phone) {
        Ok(s) => serde_json::to_value(s).unwrap_or_default(),
        Err(e) => return store_err(&req.id, e),
    };
    persist(open.diary, open.conn);
    ok(&req.id, json!({ "student": student }))
}

fn handle_students_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
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

    match open.diary.delete_student(role, id) {
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
        "teachers.list" => Some(handle_teachers_list(state, req)),
        "teachers.add" => Some(handle_teachers_add(state, req)),
        "teachers.delete" => Some(handle_teachers_delete(state, req)),
        "students.list" => Some(handle_students_list(state, req)),
        "students.add" => Some(handle_students_add(state, req)),
        "students.delete" => Some(handle_students_delete(state, req)),
        _ => None,
    }
}
