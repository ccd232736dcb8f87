// Analysis progress tracing
// Append-only JSONL trace of the per-profile pipeline stages

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during trace operations
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Stages of one profile analysis, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStage {
    GapFill,
    Decomposition,
    CrestExtraction,
    TroughExtraction,
    Geometry,
}

impl AnalysisStage {
    pub const ALL: [AnalysisStage; 5] = [
        AnalysisStage::GapFill,
        AnalysisStage::Decomposition,
        AnalysisStage::CrestExtraction,
        AnalysisStage::TroughExtraction,
        AnalysisStage::Geometry,
    ];

    /// Fraction of the pipeline done once this stage completes
    pub fn progress(&self) -> f32 {
        let position = Self::ALL.iter().position(|s| s == self).unwrap_or(0);
        (position + 1) as f32 / Self::ALL.len() as f32
    }
}

/// A single trace entry in the analysis log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    /// ISO 8601 timestamp of when this entry was created
    pub timestamp: String,

    /// Profile the entry belongs to
    pub profile_id: String,

    pub stage: AnalysisStage,

    /// Progress [0.0, 1.0] through the profile's pipeline
    pub progress: f32,

    /// Human-readable message describing the stage outcome
    pub message: String,

    /// Optional structured data (e.g. crest count, reconstruction length)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl TraceEntry {
    /// Create a new trace entry with current timestamp
    pub fn new(
        profile_id: impl Into<String>,
        stage: AnalysisStage,
        progress: f32,
        message: impl Into<String>,
    ) -> Self {
        TraceEntry {
            timestamp: Utc::now().to_rfc3339(),
            profile_id: profile_id.into(),
            stage,
            progress: progress.clamp(0.0, 1.0),
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Serialize to JSON line (with newline)
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(format!("{}\n", json))
    }
}

/// Append-only JSONL trace file
pub struct TraceWriter {
    file_path: PathBuf,
}

impl TraceWriter {
    pub fn new(file_path: PathBuf) -> Self {
        TraceWriter { file_path }
    }

    /// Append a trace entry, creating the file if needed
    pub fn write(&self, entry: &TraceEntry) -> Result<(), TraceError> {
        self.write_batch(std::slice::from_ref(entry))
    }

    /// Append several entries with one open
    pub fn write_batch(&self, entries: &[TraceEntry]) -> Result<(), TraceError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;

        for entry in entries {
            file.write_all(entry.to_json_line()?.as_bytes())?;
        }

        file.flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

/// Builds entries for one profile and stage
pub struct TraceBuilder {
    profile_id: String,
    stage: AnalysisStage,
}

impl TraceBuilder {
    pub fn new(profile_id: impl Into<String>, stage: AnalysisStage) -> Self {
        TraceBuilder {
            profile_id: profile_id.into(),
            stage,
        }
    }

    /// Entry marking the stage as finished
    pub fn complete(self, message: impl Into<String>) -> TraceEntry {
        let progress = self.stage.progress();
        TraceEntry::new(self.profile_id, self.stage, progress, message)
    }

    /// Finished entry carrying structured data
    pub fn complete_with(self, message: impl Into<String>, data: serde_json::Value) -> TraceEntry {
        self.complete(message).with_data(data)
    }
}

/// Read trace entries from a JSONL file
pub fn read_trace_file(path: &Path) -> Result<Vec<TraceEntry>, TraceError> {
    let contents = std::fs::read_to_string(path)?;

    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(TraceError::from))
        .collect()
}
