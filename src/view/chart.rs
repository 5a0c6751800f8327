//! Five-axis radar chart data
//!
//! Holds the labelled values the chart shows. Rendering is a plain text bar
//! per axis.

use crate::core::config::ExtraAxes;
use crate::core::constants::{chart, score};
use crate::core::transport::AuditError;
use crate::models::audit::Scores;

/// Width of a full bar in characters
const BAR_WIDTH: usize = 20;

/// One axis of the chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartPoint {
    pub label: &'static str,
    pub value: u8,
    /// Value is demo data rather than a server score
    pub placeholder: bool,
}

/// Radar chart over relevance, faithfulness, safety, tone and accuracy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadarChart {
    points: [ChartPoint; 5],
}

impl Default for RadarChart {
    fn default() -> Self {
        Self {
            points: chart::AXES.map(|label| ChartPoint {
                label,
                value: 0,
                placeholder: false,
            }),
        }
    }
}

impl RadarChart {
    /// Build the chart for a validated response
    ///
    /// # Errors
    ///
    /// With `ExtraAxes::Server`, returns `SchemaError` if the server did not
    /// score safety, tone and accuracy, or scored one of them malformed.
    /// Under `ExtraAxes::Placeholder` those scores are never read.
    pub fn from_scores(scores: &Scores, extra_axes: ExtraAxes) -> Result<Self, AuditError> {
        let mut result = Self::default();
        result.points[0].value = scores.relevance.score;
        result.points[1].value = scores.faithfulness.score;

        let extra_names = [score::SAFETY, score::TONE, score::ACCURACY];
        for (index, name) in extra_names.iter().enumerate() {
            let point = &mut result.points[index + 2];
            match extra_axes {
                ExtraAxes::Placeholder => {
                    point.value = chart::PLACEHOLDER_VALUES[index];
                    point.placeholder = true;
                }
                ExtraAxes::Server => {
                    let entry = scores.get(name)?.ok_or_else(|| {
                        AuditError::SchemaError(format!("missing score `{}`", name))
                    })?;
                    point.value = entry.score;
                }
            }
        }

        Ok(result)
    }

    pub fn points(&self) -> &[ChartPoint; 5] {
        &self.points
    }

    /// Data points in axis order
    pub fn values(&self) -> [u8; 5] {
        self.points.map(|p| p.value)
    }

    /// Text rendition, one bar per axis
    pub fn render(&self) -> String {
        let label_width = chart::AXES.iter().map(|l| l.len()).max().unwrap_or(0);
        self.points()
            .iter()
            .map(|point| {
                let filled = usize::from(point.value) * BAR_WIDTH / usize::from(chart::MAX_VALUE);
                format!(
                    "{:<width$} {}{} {:>3}{}",
                    point.label,
                    "█".repeat(filled),
                    "░".repeat(BAR_WIDTH - filled),
                    point.value,
                    if point.placeholder { " (placeholder)" } else { "" },
                    width = label_width,
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
