//! Constants for the audit wire contract and the visible surface
//!
//! This module defines the multipart field names, the endpoint path, the
//! chart axes and the labels shown by the status indicator and activity log.

/// Audit server wire constants
pub mod wire {
    /// Multipart field carrying the chat transcript
    pub const CHAT_FILE: &str = "chat_file";

    /// Multipart field carrying the context document
    pub const CONTEXT_FILE: &str = "context_file";

    /// Endpoint path the submission is posted to
    pub const ANALYZE_PATH: &str = "/analyze";

    /// Content type attached to each uploaded part
    pub const JSON_MIME: &str = "application/json";
}

/// Score names read from `scores` in the response
pub mod score {
    pub const RELEVANCE: &str = "relevance";
    pub const FAITHFULNESS: &str = "faithfulness";
    pub const SAFETY: &str = "safety";
    pub const TONE: &str = "tone";
    pub const ACCURACY: &str = "accuracy";
}

/// Radar chart constants
pub mod chart {
    /// Axis labels in display order
    pub const AXES: [&str; 5] = ["Relevance", "Faithfulness", "Safety", "Tone", "Accuracy"];

    /// Demo values for safety, tone and accuracy when the server does not score them
    pub const PLACEHOLDER_VALUES: [u8; 3] = [95, 88, 92];

    /// Upper bound of every axis
    pub const MAX_VALUE: u8 = 100;
}

/// Trigger control labels
pub mod trigger {
    pub const IDLE: &str = "RUN AUDIT";
    pub const PROCESSING: &str = "PROCESSING...";
    pub const COMPLETE: &str = "AUDIT COMPLETE";
    pub const RETRY: &str = "RETRY";
}

/// Activity log and alert text
pub mod message {
    pub const UPLOADING: &str = "> UPLOADING DATA TO NEURAL CORE...";
    pub const SUCCESS: &str = "> SUCCESS: METRICS COMPUTED";
    pub const FAILURE_PREFIX: &str = "> CRITICAL ERROR: ";
    pub const MISSING_FILES: &str = "⚠️ Files missing! Please select both JSON files.";
    pub const AUDIT_FAILED_PREFIX: &str = "Audit Failed: ";
    pub const SELECTED_PREFIX: &str = "✅ ";
    pub const NOT_SELECTED: &str = "No file selected";
}
