use anyhow::Result;
use chrono::{Duration, Utc};
use libmorsecast::{HistoryEntry, KvHistoryStore, KvStore, TransformMode};
use std::process::Command;
use tempfile::TempDir;

/// Helper to create a store with three logged transmissions
async fn create_test_database() -> Result<(TempDir, String)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let db_path = db_path.to_string_lossy().to_string();

    let store = KvStore::open(&db_path).await?;
    let history = KvHistoryStore::new(store.clone());

    let now = Utc::now();
    let entries = [
        ("CQ CQ DE N0CALL", "CQ CQ DE N0CALL", TransformMode::None, now - Duration::days(2)),
        ("HELLO", "KHOOR", TransformMode::Shift, now - Duration::days(1)),
        ("secret", "59 4F 49 58 4F 5E", TransformMode::Xor, now),
    ];
    for (plaintext, display, mode, timestamp) in entries {
        let mut entry = HistoryEntry::new(plaintext.to_string(), display.to_string(), mode);
        entry.timestamp = timestamp;
        history.try_append(&entry).await?;
    }

    store.close().await;
    Ok((temp_dir, db_path))
}

/// Helper to create a config file pointing to test database
fn create_test_config(config_dir: &std::path::Path, db_path: &str) -> Result<String> {
    std::fs::create_dir_all(config_dir)?;
    let config_path = config_dir.join("config.toml");

    let config_content = format!(
        r#"
[store]
path = "{}"
"#,
        db_path.replace('\\', "/")
    );

    std::fs::write(&config_path, config_content)?;
    Ok(config_path.to_string_lossy().to_string())
}

fn morse_history(config_path: &str) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_morse-history"));
    cmd.env("MORSECAST_CONFIG", config_path);
    cmd.env_remove("RUST_LOG");
    cmd
}

#[tokio::test]
async fn test_history_default_output() -> Result<()> {
    let (_temp_dir, db_path) = create_test_database().await?;
    let config_dir = TempDir::new()?;
    let config_path = create_test_config(config_dir.path(), &db_path)?;

    let output = morse_history(&config_path).output()?;

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    let lines: Vec<&str> = stdout.lines().collect();

    // Newest first
    assert!(lines[0].contains("secret"));
    assert!(stdout.contains("HELLO"));
    assert!(stdout.contains("shown as: KHOOR"));
    assert!(stdout.contains("CQ CQ DE N0CALL"));

    Ok(())
}

#[tokio::test]
async fn test_history_filter_by_mode() -> Result<()> {
    let (_temp_dir, db_path) = create_test_database().await?;
    let config_dir = TempDir::new()?;
    let config_path = create_test_config(config_dir.path(), &db_path)?;

    let output = morse_history(&config_path).args(["--mode", "shift"]).output()?;

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("HELLO"));
    assert!(!stdout.contains("secret"));
    assert!(!stdout.contains("N0CALL"));

    Ok(())
}

#[tokio::test]
async fn test_history_date_range_filtering() -> Result<()> {
    let (_temp_dir, db_path) = create_test_database().await?;
    let config_dir = TempDir::new()?;
    let config_path = create_test_config(config_dir.path(), &db_path)?;

    let since = (Utc::now() - Duration::hours(36)).timestamp().to_string();
    let output = morse_history(&config_path).args(["--since", &since]).output()?;

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("HELLO"));
    assert!(stdout.contains("secret"));
    assert!(!stdout.contains("N0CALL"));

    Ok(())
}

#[tokio::test]
async fn test_history_search_matches_display_text() -> Result<()> {
    let (_temp_dir, db_path) = create_test_database().await?;
    let config_dir = TempDir::new()?;
    let config_path = create_test_config(config_dir.path(), &db_path)?;

    let output = morse_history(&config_path).args(["--search", "khoor"]).output()?;

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("HELLO"));
    assert_eq!(stdout.lines().filter(|l| l.contains(" | #")).count(), 1);

    Ok(())
}

#[tokio::test]
async fn test_history_json_output() -> Result<()> {
    let (_temp_dir, db_path) = create_test_database().await?;
    let config_dir = TempDir::new()?;
    let config_path = create_test_config(config_dir.path(), &db_path)?;

    let output = morse_history(&config_path)
        .args(["--format", "json", "--limit", "2"])
        .output()?;

    assert!(output.status.success());
    let rows: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout)?;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], 3);
    assert_eq!(rows[0]["mode"], "xor");
    assert_eq!(rows[1]["encrypted"], "KHOOR");

    Ok(())
}

#[tokio::test]
async fn test_history_jsonl_and_csv_output() -> Result<()> {
    let (_temp_dir, db_path) = create_test_database().await?;
    let config_dir = TempDir::new()?;
    let config_path = create_test_config(config_dir.path(), &db_path)?;

    let output = morse_history(&config_path).args(["--format", "jsonl"]).output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert_eq!(stdout.lines().count(), 3);
    for line in stdout.lines() {
        serde_json::from_str::<serde_json::Value>(line)?;
    }

    let output = morse_history(&config_path).args(["--format", "csv"]).output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert_eq!(stdout.lines().next(), Some("id,timestamp,mode,message,display_text"));
    assert!(stdout.contains(",shift,\"HELLO\",\"KHOOR\""));

    Ok(())
}

#[tokio::test]
async fn test_history_missing_database_exits_1() -> Result<()> {
    let config_dir = TempDir::new()?;
    let missing = config_dir.path().join("nope.db");
    let config_path = create_test_config(config_dir.path(), &missing.to_string_lossy())?;

    let output = morse_history(&config_path).output()?;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("Database not found"));

    Ok(())
}

#[tokio::test]
async fn test_history_empty_log_is_success() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("empty.db").to_string_lossy().to_string();
    KvStore::open(&db_path).await?.close().await;
    let config_path = create_test_config(temp_dir.path(), &db_path)?;

    let output = morse_history(&config_path).output()?;

    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_history_clear() -> Result<()> {
    let (_temp_dir, db_path) = create_test_database().await?;
    let config_dir = TempDir::new()?;
    let config_path = create_test_config(config_dir.path(), &db_path)?;

    let output = morse_history(&config_path).arg("--clear").output()?;
    assert!(output.status.success());
    assert!(String::from_utf8(output.stdout)?.contains("Cleared 3 transmissions"));

    let output = morse_history(&config_path).args(["--format", "json"]).output()?;
    let rows: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout)?;
    assert!(rows.is_empty());

    Ok(())
}
