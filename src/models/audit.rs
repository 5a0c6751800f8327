//! Audit request and response models
//!
//! This module defines the two-file submission and the JSON document the
//! audit server returns for it. Responses are parsed in two stages so that a
//! body which is not JSON at all can be told apart from JSON of the wrong
//! shape.

use crate::core::constants::{score, wire};
use crate::core::transport::AuditError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// One of the two upload slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileSlot {
    Chat,
    Context,
}

impl FileSlot {
    /// Multipart field name for this slot
    pub fn field_name(&self) -> &'static str {
        match self {
            FileSlot::Chat => wire::CHAT_FILE,
            FileSlot::Context => wire::CONTEXT_FILE,
        }
    }
}

impl fmt::Display for FileSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileSlot::Chat => write!(f, "chat"),
            FileSlot::Context => write!(f, "context"),
        }
    }
}

/// A file chosen for a slot
///
/// Only the path is recorded; contents are read when the audit is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
}

impl SelectedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A complete submission: both slots filled
#[derive(Debug, Clone)]
pub struct AuditRequest {
    pub chat_file: SelectedFile,
    pub context_file: SelectedFile,
}

impl AuditRequest {
    /// Build a request from the current selection
    ///
    /// # Errors
    ///
    /// Returns `AuditError::MissingInput` listing every empty slot.
    pub fn from_selection(
        chat_file: Option<SelectedFile>,
        context_file: Option<SelectedFile>,
    ) -> Result<Self, AuditError> {
        match (chat_file, context_file) {
            (Some(chat_file), Some(context_file)) => Ok(Self {
                chat_file,
                context_file,
            }),
            (chat, context) => {
                let mut missing = Vec::new();
                if chat.is_none() {
                    missing.push(FileSlot::Chat);
                }
                if context.is_none() {
                    missing.push(FileSlot::Context);
                }
                Err(AuditError::MissingInput { missing })
            }
        }
    }

    /// Files in wire order
    pub fn parts(&self) -> [(FileSlot, &SelectedFile); 2] {
        [
            (FileSlot::Chat, &self.chat_file),
            (FileSlot::Context, &self.context_file),
        ]
    }
}

/// A scored dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    #[serde(with = "score_value")]
    pub score: u8,
    pub reason: String,
}

/// Scores keyed by dimension name
///
/// `relevance` and `faithfulness` are always present and checked on parse.
/// Any other dimension the server returns is kept as raw JSON and only
/// checked when something reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub relevance: ScoreEntry,
    pub faithfulness: ScoreEntry,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Scores {
    /// Look up a dimension by name
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if the dimension is present but is not a valid
    /// `{score, reason}` entry.
    pub fn get(&self, name: &str) -> Result<Option<ScoreEntry>, AuditError> {
        match name {
            score::RELEVANCE => Ok(Some(self.relevance.clone())),
            score::FAITHFULNESS => Ok(Some(self.faithfulness.clone())),
            other => self
                .extra
                .get(other)
                .map(|value| {
                    serde_json::from_value(value.clone()).map_err(|e| {
                        AuditError::SchemaError(format!("scores.{}: {}", other, e))
                    })
                })
                .transpose(),
        }
    }
}

/// Cost and latency metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub cost_usd: f64,
    pub latency_seconds: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
}

impl Metrics {
    /// Token counters as `in=.. out=.. total=..`, if the server sent any
    pub fn token_summary(&self) -> Option<String> {
        if self.input_tokens.is_none() && self.output_tokens.is_none() && self.total_tokens.is_none()
        {
            return None;
        }
        let show = |count: Option<u64>| count.map_or_else(|| "-".to_string(), |n| n.to_string());
        Some(format!(
            "in={} out={} total={}",
            show(self.input_tokens),
            show(self.output_tokens),
            show(self.total_tokens)
        ))
    }
}

/// Successful audit server response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    pub scores: Scores,
    pub metrics: Metrics,
}

impl AuditResponse {
    /// Parse and validate a response body
    ///
    /// # Errors
    ///
    /// `ParseFailure` when the body is not JSON, `SchemaError` when it is JSON
    /// but does not describe an audit result.
    pub fn from_json(body: &str) -> Result<Self, AuditError> {
        let value: serde_json::Value = serde_json::from_str(body)
            .map_err(|e| AuditError::ParseFailure(e.to_string()))?;

        let response: AuditResponse =
            serde_json::from_value(value).map_err(|e| AuditError::SchemaError(e.to_string()))?;

        response.validate()?;
        Ok(response)
    }

    fn validate(&self) -> Result<(), AuditError> {
        check_quantity("metrics.cost_usd", self.metrics.cost_usd)?;
        check_quantity("metrics.latency_seconds", self.metrics.latency_seconds)?;
        Ok(())
    }
}

fn check_quantity(field: &str, value: f64) -> Result<(), AuditError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AuditError::SchemaError(format!(
            "{} must be a non-negative number, got {}",
            field, value
        )))
    }
}

/// Scores arrive as integers or as numeric strings such as `"80"`
mod score_value {
    use crate::core::constants::chart::MAX_VALUE;
    use serde::de::{self, Deserializer};
    use serde::{Deserialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Integer(i64),
        Float(f64),
        Text(String),
    }

    pub fn serialize<S>(score: &u8, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(*score)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u8, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = match Raw::deserialize(deserializer)? {
            Raw::Integer(n) => n,
            Raw::Float(f) if f.fract() == 0.0 && f.is_finite() => f as i64,
            Raw::Float(f) => {
                return Err(de::Error::custom(format!("score must be an integer, got {}", f)));
            }
            Raw::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| de::Error::custom(format!("score is not an integer: {:?}", s)))?,
        };

        if (0..=i64::from(MAX_VALUE)).contains(&value) {
            Ok(value as u8)
        } else {
            Err(de::Error::custom(format!(
                "score must be between 0 and {}, got {}",
                MAX_VALUE, value
            )))
        }
    }
}
