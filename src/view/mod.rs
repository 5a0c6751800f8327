//! Audit view state
//!
//! `AuditView` owns everything the user sees: the two file labels, the
//! status indicator, the four result fields, the activity log, the radar
//! chart and any raised alerts. It is created once per session and mutated
//! only through the methods below.

pub mod chart;

pub use chart::RadarChart;

use crate::core::constants::{message, trigger};
use crate::models::audit::{FileSlot, Metrics, Scores};
use chrono::{DateTime, Local};

/// Placeholder shown in a result field with no value
pub const EMPTY_FIELD: &str = "--";

/// Status indicator states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Processing,
    Complete,
    Retry,
}

impl Status {
    /// Label of the trigger control in this state
    pub fn label(&self) -> &'static str {
        match self {
            Status::Idle => trigger::IDLE,
            Status::Processing => trigger::PROCESSING,
            Status::Complete => trigger::COMPLETE,
            Status::Retry => trigger::RETRY,
        }
    }
}

/// A line in the activity log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityLine {
    pub at: DateTime<Local>,
    pub text: String,
    pub failure: bool,
}

#[derive(Debug, Clone)]
pub struct AuditView {
    chat_label: String,
    context_label: String,
    status: Status,
    relevance: String,
    faithfulness: String,
    cost: String,
    latency: String,
    chart: RadarChart,
    activity: Vec<ActivityLine>,
    alerts: Vec<String>,
}

impl Default for AuditView {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditView {
    pub fn new() -> Self {
        Self {
            chat_label: message::NOT_SELECTED.to_string(),
            context_label: message::NOT_SELECTED.to_string(),
            status: Status::Idle,
            relevance: EMPTY_FIELD.to_string(),
            faithfulness: EMPTY_FIELD.to_string(),
            cost: EMPTY_FIELD.to_string(),
            latency: EMPTY_FIELD.to_string(),
            chart: RadarChart::default(),
            activity: Vec::new(),
            alerts: Vec::new(),
        }
    }

    /// Acknowledge a file selection on its slot's label
    pub fn set_file_label(&mut self, slot: FileSlot, file_name: &str) {
        let label = format!("{}{}", message::SELECTED_PREFIX, file_name);
        match slot {
            FileSlot::Chat => self.chat_label = label,
            FileSlot::Context => self.context_label = label,
        }
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    /// Clear result fields and the chart
    pub fn reset(&mut self) {
        self.relevance = EMPTY_FIELD.to_string();
        self.faithfulness = EMPTY_FIELD.to_string();
        self.cost = EMPTY_FIELD.to_string();
        self.latency = EMPTY_FIELD.to_string();
        self.chart = RadarChart::default();
    }

    /// Write a result onto the display fields and chart
    pub fn update(&mut self, scores: &Scores, metrics: &Metrics, chart: RadarChart) {
        self.relevance = format!("{}%", scores.relevance.score);
        self.faithfulness = format!("{}%", scores.faithfulness.score);
        self.cost = format!("${}", metrics.cost_usd);
        self.latency = format!("{}s", metrics.latency_seconds);
        self.chart = chart;
    }

    /// Append a line to the activity log
    pub fn log(&mut self, text: impl Into<String>) {
        self.push_line(text.into(), false);
    }

    /// Append a failure line to the activity log
    pub fn log_failure(&mut self, detail: &str) {
        self.push_line(format!("{}{}", message::FAILURE_PREFIX, detail), true);
    }

    fn push_line(&mut self, text: String, failure: bool) {
        self.activity.push(ActivityLine {
            at: Local::now(),
            text,
            failure,
        });
    }

    /// Raise a user-facing alert
    pub fn alert(&mut self, text: impl Into<String>) {
        self.alerts.push(text.into());
    }

    pub fn label(&self, slot: FileSlot) -> &str {
        match slot {
            FileSlot::Chat => &self.chat_label,
            FileSlot::Context => &self.context_label,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn relevance(&self) -> &str {
        &self.relevance
    }

    pub fn faithfulness(&self) -> &str {
        &self.faithfulness
    }

    pub fn cost(&self) -> &str {
        &self.cost
    }

    pub fn latency(&self) -> &str {
        &self.latency
    }

    pub fn chart(&self) -> &RadarChart {
        &self.chart
    }

    pub fn activity(&self) -> &[ActivityLine] {
        &self.activity
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    /// Render the whole panel as text
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Chat log:     {}\n", self.chat_label));
        out.push_str(&format!("Context:      {}\n", self.context_label));
        out.push_str(&format!("[ {} ]\n\n", self.status.label()));

        out.push_str(&format!("Relevance:    {}\n", self.relevance));
        out.push_str(&format!("Faithfulness: {}\n", self.faithfulness));
        out.push_str(&format!("Cost:         {}\n", self.cost));
        out.push_str(&format!("Latency:      {}\n\n", self.latency));

        out.push_str(&self.chart.render());
        out.push_str("\n\n");

        for line in &self.activity {
            out.push_str(&format!("[{}] {}\n", line.at.format("%H:%M:%S"), line.text));
        }
        out
    }
}
