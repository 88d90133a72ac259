//! Transcript recorder implementation

use crate::conversation::TurnStatus;
use crate::error::{Result, TranscriptError};
use crate::transcript::{EntryType, TranscriptEntry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;

/// Records conversation turns for debugging and replay
pub struct TranscriptRecorder {
    entries: RwLock<Vec<TranscriptEntry>>,
    file_path: Option<PathBuf>,
    auto_save: bool,
}

/// Complete transcript data as written to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub metadata: TranscriptMetadata,
    pub entries: Vec<TranscriptEntry>,
}

/// Summary of a transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptMetadata {
    /// Unique identifier for this transcript
    pub id: String,

    /// Timestamp of the first entry
    pub started_at: DateTime<Utc>,

    /// Timestamp of the last entry
    pub completed_at: Option<DateTime<Utc>>,

    /// Version of the transcript format
    pub version: String,

    /// Number of accepted turns
    pub turns: usize,

    /// Number of turns that ended with an answer
    pub answered_turns: usize,

    /// Total number of entries
    pub total_entries: usize,

    /// Span between first and last entry in milliseconds
    pub duration_ms: Option<u64>,
}

impl TranscriptRecorder {
    /// Create an in-memory recorder
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            file_path: None,
            auto_save: false,
        }
    }

    /// Create a recorder that saves to a file after every entry
    pub fn with_file<P: AsRef<Path>>(path: P) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            file_path: Some(path.as_ref().to_path_buf()),
            auto_save: true,
        }
    }

    /// Create a recorder writing to `transcripts/transcript_<timestamp>.json`
    pub fn with_auto_filename() -> Self {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        Self::with_file(Path::new("transcripts").join(format!("transcript_{}.json", timestamp)))
    }

    /// Record an entry
    pub async fn record(&self, entry: TranscriptEntry) -> Result<()> {
        self.entries.write().await.push(entry);

        if self.auto_save {
            self.save().await?;
        }

        Ok(())
    }

    /// Get all recorded entries
    pub async fn get_entries(&self) -> Vec<TranscriptEntry> {
        self.entries.read().await.clone()
    }

    /// Get the number of recorded entries
    pub async fn entry_count(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Save the transcript to its file, if any
    pub async fn save(&self) -> Result<()> {
        if let Some(path) = &self.file_path {
            let transcript = self.build_transcript().await;
            let json = serde_json::to_string_pretty(&transcript).map_err(|e| {
                TranscriptError::RecordingFailed {
                    message: format!("Failed to serialize transcript: {}", e),
                }
            })?;

            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).await?;
                }
            }

            fs::write(path, json).await?;
        }

        Ok(())
    }

    /// Load a transcript from file
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Transcript> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(TranscriptError::LoadFailed {
                path: path.to_string_lossy().to_string(),
            }
            .into());
        }

        let content = fs::read_to_string(path).await?;
        let transcript: Transcript =
            serde_json::from_str(&content).map_err(|_| TranscriptError::InvalidFormat)?;

        Ok(transcript)
    }

    async fn build_transcript(&self) -> Transcript {
        let entries = self.entries.read().await.clone();

        let started_at = entries
            .first()
            .map(|e| e.timestamp)
            .unwrap_or_else(Utc::now);
        let completed_at = entries.last().map(|e| e.timestamp);
        let duration_ms =
            completed_at.map(|end| (end - started_at).num_milliseconds().max(0) as u64);

        let mut turns = 0;
        let mut answered_turns = 0;
        for entry in &entries {
            match &entry.entry_type {
                EntryType::TurnStart { .. } => turns += 1,
                EntryType::TurnComplete {
                    status: TurnStatus::Answered,
                    ..
                } => answered_turns += 1,
                _ => {}
            }
        }

        let metadata = TranscriptMetadata {
            id: uuid::Uuid::new_v4().to_string(),
            started_at,
            completed_at,
            version: "1.0".to_string(),
            turns,
            answered_turns,
            total_entries: entries.len(),
            duration_ms,
        };

        Transcript { metadata, entries }
    }

    /// Clear all recorded entries
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Get the file path if set
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }
}

impl Default for TranscriptRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::FunctionCall;
    use crate::error::Error;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_in_memory_recording() {
        let recorder = TranscriptRecorder::new();
        recorder
            .record(TranscriptEntry::turn_start("dark mode"))
            .await
            .unwrap();
        recorder
            .record(TranscriptEntry::tool_call(FunctionCall::new(
                "change_theme",
                json!({"theme": "dark"}),
            )))
            .await
            .unwrap();

        assert_eq!(recorder.entry_count().await, 2);
        assert!(recorder.file_path().is_none());

        recorder.clear().await;
        assert_eq!(recorder.entry_count().await, 0);
    }

    #[tokio::test]
    async fn test_auto_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("transcript.json");
        let recorder = TranscriptRecorder::with_file(&path);

        recorder
            .record(TranscriptEntry::turn_start("show errors"))
            .await
            .unwrap();
        recorder
            .record(TranscriptEntry::turn_complete(
                TurnStatus::Answered,
                Some("Showing errors.".to_string()),
                1,
                12,
            ))
            .await
            .unwrap();
        recorder
            .record(TranscriptEntry::turn_start("again"))
            .await
            .unwrap();

        let transcript = TranscriptRecorder::load(&path).await.unwrap();
        assert_eq!(transcript.entries.len(), 3);
        assert_eq!(transcript.metadata.turns, 2);
        assert_eq!(transcript.metadata.answered_turns, 1);
        assert_eq!(transcript.metadata.total_entries, 3);

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["entries"][0]["entry_type"]["type"], "turn_start");
        assert_eq!(raw["entries"][1]["entry_type"]["status"], "answered");
    }

    #[tokio::test]
    async fn test_load_errors() {
        let dir = TempDir::new().unwrap();

        let missing = TranscriptRecorder::load(dir.path().join("missing.json")).await;
        assert!(matches!(
            missing,
            Err(Error::Transcript(TranscriptError::LoadFailed { .. }))
        ));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{\"entries\": 1}").unwrap();
        assert!(matches!(
            TranscriptRecorder::load(&bad).await,
            Err(Error::Transcript(TranscriptError::InvalidFormat))
        ));
    }
}
