use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

/// The one durable slot the diary state is mirrored into.
pub const SNAPSHOT_KEY: &str = "diary.snapshot";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join("dnevnik.sqlite3");
    let conn = Connection::open(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS snapshot(
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )?;

    Ok(conn)
}

/// Reads the slot. A missing row and an unparseable one are the same outcome
/// for callers: `None`, defaults apply. The parse failure is logged and
/// never surfaced.
pub fn snapshot_get_json(conn: &Connection, key: &str) -> anyhow::Result<Option<serde_json::Value>> {
    let raw: Option<String> = conn
        .query_row("SELECT value FROM snapshot WHERE key = ?", [key], |row| {
            row.get(0)
        })
        .optional()?;

    match raw {
        None => Ok(None),
        Some(text) => match serde_json::from_str(&text) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                log::warn!(
                    "snapshot under {:?} is not valid JSON ({}); ignoring it",
                    key,
                    &e
                );
                Ok(None)
            }
        },
    }
}

pub fn snapshot_set_json(
    conn: &Connection,
    key: &str,
    value: &serde_json::Value,
) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO snapshot(key, value) VALUES(?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        (key, value.to_string()),
    )?;
    Ok(())
}
