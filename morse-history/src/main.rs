use anyhow::{Context, Result};
use clap::Parser;
use libmorsecast::{KvHistoryStore, KvStore, TransformMode, TransmissionRecord};

#[derive(Parser, Debug)]
#[command(name = "morse-history")]
#[command(version, about = "Query the local transmission log")]
#[command(long_about = r#"Query the local transmission log with filtering and formatting options.

EXAMPLES:
    # Show the last 20 transmissions (default)
    morse-history

    # Show more
    morse-history --limit 50

    # Filter by transform mode
    morse-history --mode xor

    # Filter by date range
    morse-history --since "2026-10-01" --until "2026-10-05"
    morse-history --since "2026-10-01T09:00:00Z"

    # Search plaintext and displayed text
    morse-history --search "cq"

    # JSON output for scripting
    morse-history --format json | jq '.[] | .message'

    # JSONL output (one JSON object per line)
    morse-history --format jsonl

    # Export to CSV
    morse-history --format csv > transmissions.csv

    # Forget everything
    morse-history --clear

OUTPUT FORMATS:
    text  - Human-readable, newest first (default)
    json  - JSON array, newest first
    jsonl - JSON lines, one object per line
    csv   - CSV with headers

EXIT CODES:
    0 - Success (including empty results)
    1 - Error (database not found, unreadable log, etc.)
"#)]
struct Args {
    /// Filter by transform mode (none, shift, binary, xor)
    #[arg(short, long, value_name = "MODE")]
    mode: Option<TransformMode>,

    /// Show transmissions since this date (Unix timestamp, YYYY-MM-DD, or ISO 8601)
    #[arg(long, value_name = "DATE")]
    since: Option<String>,

    /// Show transmissions until this date (Unix timestamp, YYYY-MM-DD, or ISO 8601)
    #[arg(long, value_name = "DATE")]
    until: Option<String>,

    /// Case-insensitive substring match on the message or its displayed form
    #[arg(short, long, value_name = "TERM")]
    search: Option<String>,

    /// Maximum number of transmissions to return
    #[arg(short, long, default_value = "20", value_name = "N")]
    limit: usize,

    /// Output format
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    #[arg(value_parser = ["text", "json", "jsonl", "csv"])]
    format: String,

    /// Delete the whole log
    #[arg(long, conflicts_with_all = ["mode", "since", "until", "search"])]
    clear: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Filters applied to the log
#[derive(Debug, Default)]
struct HistoryQuery {
    mode: Option<TransformMode>,
    since: Option<i64>,
    until: Option<i64>,
    search: Option<String>,
    limit: usize,
}

impl HistoryQuery {
    fn matches(&self, record: &TransmissionRecord) -> bool {
        if let Some(mode) = self.mode {
            if record.mode != mode {
                return false;
            }
        }

        let at = record.timestamp.timestamp();
        if self.since.is_some_and(|since| at < since) {
            return false;
        }
        if self.until.is_some_and(|until| at > until) {
            return false;
        }

        if let Some(ref term) = self.search {
            let term = term.to_lowercase();
            if !record.message.to_lowercase().contains(&term)
                && !record.encrypted.to_lowercase().contains(&term)
            {
                return false;
            }
        }

        true
    }

    /// Matching records, newest first
    fn apply(&self, records: Vec<TransmissionRecord>) -> Vec<TransmissionRecord> {
        records
            .into_iter()
            .rev()
            .filter(|r| self.matches(r))
            .take(self.limit)
            .collect()
    }
}

/// Parse date string to Unix timestamp
fn parse_date(date_str: &str) -> Result<i64> {
    // Try parsing as Unix timestamp first
    if let Ok(timestamp) = date_str.parse::<i64>() {
        return Ok(timestamp);
    }

    let dt = chrono::DateTime::parse_from_rfc3339(date_str)
        .or_else(|_| {
            // Date only (YYYY-MM-DD) means midnight UTC
            chrono::NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
                .map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc().fixed_offset())
        })
        .with_context(|| {
            format!(
                "Invalid date format: {}. Use Unix timestamp or ISO 8601 (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SSZ)",
                date_str
            )
        })?;

    Ok(dt.timestamp())
}

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn print_records(records: &[TransmissionRecord], format: &str) -> Result<()> {
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(records)?);
        }
        "jsonl" => {
            for record in records {
                println!("{}", serde_json::to_string(record)?);
            }
        }
        "csv" => {
            println!("id,timestamp,mode,message,display_text");
            for record in records {
                println!(
                    "{},{},{},{},{}",
                    record.id,
                    record.timestamp.to_rfc3339(),
                    record.mode,
                    csv_field(&record.message),
                    csv_field(&record.encrypted)
                );
            }
        }
        _ => {
            for record in records {
                let timestamp = record.timestamp.format("%Y-%m-%d %H:%M:%S");
                println!(
                    "{} | #{} | {} | {}",
                    timestamp, record.id, record.mode, record.message
                );
                if record.encrypted != record.message {
                    println!("  shown as: {}", record.encrypted);
                }
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    libmorsecast::logging::from_env(args.verbose).init();

    tracing::debug!("morse-history started with args: {:?}", args);

    let config = libmorsecast::Config::load().context("Failed to load configuration")?;
    let db_path = config.store_path();

    if !std::path::Path::new(&db_path).exists() {
        eprintln!("Error: Database not found at {}", db_path);
        eprintln!("Have you sent anything yet? Try: morse-send SOS");
        std::process::exit(1);
    }

    if args.clear {
        let store = KvStore::open(&db_path)
            .await
            .context("Failed to open database")?;
        let removed = KvHistoryStore::new(store.clone())
            .clear()
            .await
            .context("Failed to clear transmission log")?;
        store.close().await;
        println!("Cleared {} transmissions", removed);
        return Ok(());
    }

    let store = KvStore::open_read_only(&db_path)
        .await
        .context("Failed to open database")?;
    let records = KvHistoryStore::new(store.clone())
        .load()
        .await
        .context("Failed to read transmission log")?;
    store.close().await;

    let query = HistoryQuery {
        mode: args.mode,
        since: args.since.as_deref().map(parse_date).transpose()?,
        until: args.until.as_deref().map(parse_date).transpose()?,
        search: args.search,
        limit: args.limit,
    };

    let records = query.apply(records);
    print_records(&records, &args.format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(id: i64, message: &str, mode: TransformMode, day: u32) -> TransmissionRecord {
        let timestamp = Utc.with_ymd_and_hms(2026, 10, day, 12, 0, 0).unwrap();
        TransmissionRecord {
            id,
            message: message.to_string(),
            encrypted: message.to_string(),
            timestamp,
            mode,
            created_at: timestamp.timestamp(),
        }
    }

    fn sample() -> Vec<TransmissionRecord> {
        vec![
            record(1, "CQ CQ", TransformMode::None, 1),
            record(2, "HELLO", TransformMode::Shift, 2),
            record(3, "cq again", TransformMode::None, 3),
        ]
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("0").unwrap(), 0);
        assert_eq!(parse_date("1970-01-02").unwrap(), 86400);
        assert_eq!(parse_date("1970-01-01T00:01:00Z").unwrap(), 60);
        assert!(parse_date("yesterday").is_err());
    }

    #[test]
    fn test_newest_first_with_limit() {
        let query = HistoryQuery {
            limit: 2,
            ..Default::default()
        };
        let ids: Vec<i64> = query.apply(sample()).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let query = HistoryQuery {
            search: Some("CQ".to_string()),
            limit: 10,
            ..Default::default()
        };
        let ids: Vec<i64> = query.apply(sample()).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_mode_and_date_filters() {
        let since = Utc.with_ymd_and_hms(2026, 10, 2, 0, 0, 0).unwrap().timestamp();
        let query = HistoryQuery {
            mode: Some(TransformMode::None),
            since: Some(since),
            limit: 10,
            ..Default::default()
        };
        let ids: Vec<i64> = query.apply(sample()).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn test_csv_field_escapes_quotes() {
        assert_eq!(csv_field(r#"say "hi""#), r#""say ""hi""""#);
    }
}
