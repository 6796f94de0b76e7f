//! Interaction Logger
//!
//! Append-only audit trail of every pipeline stage's input and output.
//! One pretty-printed JSON record per call, each followed by a newline.
//! The file is opened in append mode, written with a single `write_all`,
//! and closed on every call - no handle is held across calls, so the
//! synchronous and background paths can both append without coordination.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use serde::{Deserialize, Serialize};

/// Which stage produced a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Origin {
    User,
    SmallMind,
    BigMind,
    Agent,
    System,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::SmallMind => "SMALL_MIND",
            Self::BigMind => "BIG_MIND",
            Self::Agent => "AGENT",
            Self::System => "SYSTEM",
        }
    }
}

/// A single audit record. Field order is the serialized key order.
#[derive(Debug, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub origin: Origin,
    pub content: serde_json::Value,
}

/// Append-only interaction log backed by a single text file.
#[derive(Debug, Clone)]
pub struct InteractionLogger {
    path: PathBuf,
}

impl InteractionLogger {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record. Open, write, close - each record lands in a
    /// single write so entries are never interleaved.
    pub fn log_interaction(&self, origin: Origin, content: impl Serialize) -> Result<()> {
        let entry = LogEntry {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            origin,
            content: serde_json::to_value(content)?,
        };

        let mut record = serde_json::to_string_pretty(&entry)?;
        record.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(record.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_names() {
        assert_eq!(Origin::SmallMind.as_str(), "SMALL_MIND");
        assert_eq!(
            serde_json::to_string(&Origin::BigMind).unwrap(),
            "\"BIG_MIND\""
        );
    }

    #[test]
    fn test_records_appended_in_call_order() {
        let dir = tempfile::tempdir().unwrap();
        let logger = InteractionLogger::new(dir.path().join("interactions.log"));

        logger.log_interaction(Origin::User, "first").unwrap();
        logger
            .log_interaction(Origin::SmallMind, serde_json::json!({"n": 2}))
            .unwrap();

        let raw = std::fs::read_to_string(logger.path()).unwrap();
        let first = raw.find("\"USER\"").unwrap();
        let second = raw.find("\"SMALL_MIND\"").unwrap();
        assert!(first < second);
    }
}
