use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_dnevnikd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn dnevnikd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

#[test]
fn every_builtin_account_logs_in_with_its_role() {
    // Sessions do not need a workspace.
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let accounts = [
        ("ученик", "1234", "student", "Ученик"),
        ("учитель", "1234", "teacher", "Учитель"),
        ("завуч", "1234", "deputy", "Завуч"),
        ("директор", "1234", "principal", "Директор"),
        ("директор", "89223109976", "principal", "Директор"),
    ];

    for (i, (username, password, role, role_name)) in accounts.iter().enumerate() {
        let id = format!("login-{i}");
        let result = request_ok(
            &mut stdin,
            &mut reader,
            &id,
            "session.login",
            json!({ "username": username, "password": password }),
        );
        assert_eq!(result.pointer("/loggedIn").and_then(|v| v.as_bool()), Some(true));
        assert_eq!(result.pointer("/role").and_then(|v| v.as_str()), Some(*role));
        assert_eq!(
            result.pointer("/roleName").and_then(|v| v.as_str()),
            Some(*role_name)
        );
    }
}

#[test]
fn principal_alternate_credential_is_case_insensitive() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "session.login",
        json!({ "username": "ДИРЕКТОР", "password": "89223109976" }),
    );
    assert_eq!(result.pointer("/role").and_then(|v| v.as_str()), Some("principal"));
    assert_eq!(
        result.pointer("/username").and_then(|v| v.as_str()),
        Some("директор")
    );
}

#[test]
fn bad_credentials_leave_the_session_logged_out_with_an_error() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let denied = request(
        &mut stdin,
        &mut reader,
        "1",
        "session.login",
        json!({ "username": "ученик", "password": "wrong" }),
    );
    assert_eq!(denied.get("ok").and_then(|v| v.as_bool()), Some(false));
    assert_eq!(
        denied.pointer("/error/code").and_then(|v| v.as_str()),
        Some("invalid_credentials")
    );

    let session = request_ok(&mut stdin, &mut reader, "2", "session.get", json!({}));
    assert_eq!(session.pointer("/loggedIn").and_then(|v| v.as_bool()), Some(false));
    assert!(session.pointer("/role").expect("role field").is_null());
    let error = session.pointer("/error").and_then(|v| v.as_str()).expect("error set");
    assert!(!error.is_empty());
}

#[test]
fn logout_resets_to_the_initial_state_without_a_residual_role() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "session.login",
        json!({ "username": "директор", "password": "1234" }),
    );
    let result = request_ok(&mut stdin, &mut reader, "2", "session.logout", json!({}));
    assert_eq!(result.pointer("/loggedIn").and_then(|v| v.as_bool()), Some(false));

    let session = request_ok(&mut stdin, &mut reader, "3", "session.get", json!({}));
    assert_eq!(session.pointer("/loggedIn").and_then(|v| v.as_bool()), Some(false));
    assert!(session.pointer("/role").expect("role field").is_null());
    assert!(session.pointer("/username").expect("username field").is_null());
    assert!(session.pointer("/error").expect("error field").is_null());
}

#[test]
fn successful_login_replaces_a_failed_one() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request(
        &mut stdin,
        &mut reader,
        "1",
        "session.login",
        json!({ "username": "завуч", "password": "nope" }),
    );
    let result = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "session.login",
        json!({ "username": "завуч", "password": "1234" }),
    );
    assert_eq!(result.pointer("/role").and_then(|v| v.as_str()), Some("deputy"));

    let session = request_ok(&mut stdin, &mut reader, "3", "session.get", json!({}));
    assert_eq!(session.pointer("/loggedIn").and_then(|v| v.as_bool()), Some(true));
    assert!(session.pointer("/error").expect("error field").is_null());
}
