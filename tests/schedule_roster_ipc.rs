use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

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

fn error_code(value: &serde_json::Value) -> &str {
    value
        .pointer("/error/code")
        .and_then(|v| v.as_str())
        .unwrap_or("missing")
}

#[test]
fn seeded_schedule_survives_a_missing_id_delete() {
    let workspace = temp_dir("dnevnik-schedule-seed");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "session.login",
        json!({ "username": "директор", "password": "89223109976" }),
    );

    let before = request_ok(&mut stdin, &mut reader, "3", "schedule.list", json!({}));
    let lessons = before
        .pointer("/schedule")
        .and_then(|v| v.as_array())
        .expect("schedule")
        .clone();
    assert_eq!(lessons.len(), 5);
    assert_eq!(
        lessons[0].pointer("/subject").and_then(|v| v.as_str()),
        Some("Математика")
    );

    let removed = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "schedule.delete",
        json!({ "id": 99 }),
    );
    assert_eq!(removed.pointer("/removed").and_then(|v| v.as_bool()), Some(false));

    let after = request_ok(&mut stdin, &mut reader, "5", "schedule.list", json!({}));
    assert_eq!(
        after.pointer("/schedule").and_then(|v| v.as_array()),
        Some(&lessons)
    );

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn roster_mutation_is_principal_only() {
    let workspace = temp_dir("dnevnik-roster-gating");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    // The deputy can manage content but not the rosters or the schedule.
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "session.login",
        json!({ "username": "завуч", "password": "1234" }),
    );
    let lesson = request(
        &mut stdin,
        &mut reader,
        "3",
        "schedule.add",
        json!({ "time": "13:20 - 14:05", "subject": "Химия", "teacher": "Орлова Н.В.", "room": "110" }),
    );
    assert_eq!(error_code(&lesson), "forbidden");
    let teacher = request(
        &mut stdin,
        &mut reader,
        "4",
        "teachers.delete",
        json!({ "id": 1 }),
    );
    assert_eq!(error_code(&teacher), "forbidden");
    let student = request(
        &mut stdin,
        &mut reader,
        "5",
        "students.add",
        json!({ "name": "Новиков Иван", "class": "7А", "email": "novikov@school.ru", "phone": "-" }),
    );
    assert_eq!(error_code(&student), "forbidden");

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn principal_manages_rosters_and_schedule_end_to_end() {
    let workspace = temp_dir("dnevnik-roster-crud");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "session.login",
        json!({ "username": "директор", "password": "1234" }),
    );

    let teachers = request_ok(&mut stdin, &mut reader, "3", "teachers.list", json!({}));
    assert_eq!(
        teachers
            .pointer("/teachers")
            .and_then(|v| v.as_array())
            .map(|a| a.len()),
        Some(4)
    );

    let added = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "teachers.add",
        json!({ "name": "Орлова Нина Васильевна", "subject": "Химия", "email": "orlova@school.ru", "phone": "+7 (999) 890-12-34" }),
    );
    let teacher_id = added
        .pointer("/teacher/id")
        .and_then(|v| v.as_i64())
        .expect("teacher id");
    assert_eq!(teacher_id, 5);

    let removed = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "teachers.delete",
        json!({ "id": teacher_id }),
    );
    assert_eq!(removed.pointer("/removed").and_then(|v| v.as_bool()), Some(true));

    // The freed id is not handed out again.
    let readded = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "teachers.add",
        json!({ "name": "Волкова Ольга Николаевна", "subject": "Английский язык", "email": "volkova@school.ru", "phone": "-" }),
    );
    assert_eq!(
        readded.pointer("/teacher/id").and_then(|v| v.as_i64()),
        Some(6)
    );

    let students = request_ok(&mut stdin, &mut reader, "7", "students.list", json!({}));
    assert_eq!(
        students
            .pointer("/students")
            .and_then(|v| v.as_array())
            .map(|a| a.len()),
        Some(3)
    );
    let added = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "students.add",
        json!({ "name": "Новиков Иван Петрович", "class": "7Б", "email": "novikov@school.ru", "phone": "-" }),
    );
    assert_eq!(
        added.pointer("/student/class").and_then(|v| v.as_str()),
        Some("7Б")
    );
    assert_eq!(added.pointer("/student/id").and_then(|v| v.as_i64()), Some(4));

    let lesson = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "schedule.add",
        json!({ "time": "13:20 - 14:05", "subject": "Химия", "teacher": "Орлова Н.В.", "room": "110" }),
    );
    let lesson_id = lesson
        .pointer("/lesson/id")
        .and_then(|v| v.as_i64())
        .expect("lesson id");
    assert_eq!(lesson_id, 6);
    let listed = request_ok(&mut stdin, &mut reader, "10", "schedule.list", json!({}));
    assert_eq!(
        listed
            .pointer("/schedule")
            .and_then(|v| v.as_array())
            .map(|a| a.len()),
        Some(6)
    );
    let removed = request_ok(
        &mut stdin,
        &mut reader,
        "11",
        "schedule.delete",
        json!({ "id": lesson_id }),
    );
    assert_eq!(removed.pointer("/removed").and_then(|v| v.as_bool()), Some(true));

    // Missing params are rejected up front.
    let bad = request(
        &mut stdin,
        &mut reader,
        "12",
        "students.add",
        json!({ "name": "Без класса" }),
    );
    assert_eq!(error_code(&bad), "bad_params");

    let _ = std::fs::remove_dir_all(workspace);
}
