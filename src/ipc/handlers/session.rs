use crate::auth::Session;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::required_str;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_login(state: &mut AppState, req: &Request) -> serde_json::Value {
    let username = match required_str(req, "username") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let password = match req.params.get("password").and_then(|v| v.as_str()) {
        Some(v) => v.to_string(),
        None => return err(&req.id, "bad_params", "missing params.password", None),
    };

    match state.session.login(state.provider.as_ref(), &username, &password) {
        Ok(role) => ok(
            &req.id,
            json!({
                "loggedIn": true,
                "role": role.as_str(),
                "roleName": role.display_name(),
                "username": username.to_lowercase()
            }),
        ),
        Err(e) => err(&req.id, "invalid_credentials", e.to_string(), None),
    }
}

fn handle_logout(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.session.logout();
    ok(&req.id, json!({ "loggedIn": false }))
}

fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let result = match &state.session {
        Session::LoggedIn { username, role } => json!({
            "loggedIn": true,
            "role": role.as_str(),
            "roleName": role.display_name(),
            "username": username,
            "error": null
        }),
        Session::LoggedOut { error } => json!({
            "loggedIn": false,
            "role": null,
            "roleName": null,
            "username": null,
            "error": error
        }),
    };
    ok(&req.id, result)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "session.login" => Some(handle_login(state, req)),
        "session.logout" => Some(handle_logout(state, req)),
        "session.get" => Some(handle_get(state, req)),
        _ => None,
    }
}
