//! Transport abstraction for the audit server
//!
//! The session talks to the server only through `AuditTransport`, so the
//! HTTP implementation can be swapped for an in-process one in tests.

use crate::models::audit::{AuditRequest, AuditResponse, FileSlot};
use async_trait::async_trait;
use thiserror::Error;

/// Error types for an audit submission
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Missing input: no file selected for {}", describe_slots(.missing))]
    MissingInput { missing: Vec<FileSlot> },

    #[error("An audit is already in progress")]
    AuditInFlight,

    #[error("Server Error ({status}): {body}")]
    ServerError { status: u16, body: String },

    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("Failed to parse response: {0}")]
    ParseFailure(String),

    #[error("Response does not match the audit schema: {0}")]
    SchemaError(String),
}

impl AuditError {
    /// Whether the error was raised before any network activity
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            AuditError::MissingInput { .. } | AuditError::AuditInFlight
        )
    }
}

fn describe_slots(slots: &[FileSlot]) -> String {
    slots
        .iter()
        .map(|slot| slot.to_string())
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Trait for audit server transports
#[async_trait]
pub trait AuditTransport: Send + Sync {
    /// Upload both files and return the validated response
    async fn analyze(&self, request: &AuditRequest) -> Result<AuditResponse, AuditError>;

    /// Get the transport name
    fn transport_name(&self) -> &str;
}
