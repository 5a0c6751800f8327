//! Audit submission session
//!
//! `AuditSession` records the two file selections, drives the status
//! indicator and submits through an `AuditTransport`. Only one submission may
//! be in flight per session; a second `run_audit` while one is pending is
//! rejected without touching the network.

use crate::core::config::ExtraAxes;
use crate::core::constants::message;
use crate::core::transport::{AuditError, AuditTransport};
use crate::models::audit::{AuditRequest, AuditResponse, FileSlot, SelectedFile};
use crate::view::{AuditView, RadarChart, Status};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

#[derive(Default)]
struct Selection {
    chat: Option<SelectedFile>,
    context: Option<SelectedFile>,
}

/// Clears the in-flight flag when a submission settles
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct AuditSession {
    transport: Arc<dyn AuditTransport>,
    extra_axes: ExtraAxes,
    selection: Mutex<Selection>,
    view: Mutex<AuditView>,
    in_flight: AtomicBool,
}

impl AuditSession {
    pub fn new(transport: Arc<dyn AuditTransport>, extra_axes: ExtraAxes) -> Self {
        Self {
            transport,
            extra_axes,
            selection: Mutex::new(Selection::default()),
            view: Mutex::new(AuditView::new()),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Record a file for a slot and acknowledge it on that slot's label
    ///
    /// No validation happens here; any path is accepted.
    pub async fn select_file(&self, slot: FileSlot, path: impl Into<PathBuf>) {
        let file = SelectedFile::new(path);
        debug!("{} file picked: {}", slot, file.name);

        self.view.lock().await.set_file_label(slot, &file.name);

        let mut selection = self.selection.lock().await;
        match slot {
            FileSlot::Chat => selection.chat = Some(file),
            FileSlot::Context => selection.context = Some(file),
        }
    }

    /// Whether a submission is currently pending
    #[cfg(test)]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Snapshot of the current view
    pub async fn view(&self) -> AuditView {
        self.view.lock().await.clone()
    }

    /// Submit both selected files and apply the outcome to the view
    ///
    /// # Errors
    ///
    /// `MissingInput` and `AuditInFlight` are raised before any network
    /// activity and leave the status indicator as it was. Every other error
    /// moves the status to `Retry`.
    pub async fn run_audit(&self) -> Result<AuditResponse, AuditError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Audit requested while another is in flight");
            return Err(AuditError::AuditInFlight);
        }
        let _in_flight = InFlight(&self.in_flight);

        let request = {
            let selection = self.selection.lock().await;
            AuditRequest::from_selection(selection.chat.clone(), selection.context.clone())
        };
        let request = match request {
            Ok(request) => request,
            Err(e) => {
                warn!("{}", e);
                self.view.lock().await.alert(message::MISSING_FILES);
                return Err(e);
            }
        };

        let run_id = Uuid::new_v4();
        info!(
            %run_id,
            transport = self.transport.transport_name(),
            "Submitting audit: chat={} context={}",
            request.chat_file.name,
            request.context_file.name
        );

        {
            let mut view = self.view.lock().await;
            view.reset();
            view.set_status(Status::Processing);
            view.log(message::UPLOADING);
        }

        let outcome = match self.transport.analyze(&request).await {
            Ok(response) => RadarChart::from_scores(&response.scores, self.extra_axes)
                .map(|chart| (response, chart)),
            Err(e) => Err(e),
        };

        let mut view = self.view.lock().await;
        match outcome {
            Ok((response, chart)) => {
                info!(
                    %run_id,
                    relevance = response.scores.relevance.score,
                    faithfulness = response.scores.faithfulness.score,
                    "Audit complete"
                );
                view.update(&response.scores, &response.metrics, chart);
                view.log(message::SUCCESS);
                if let Some(query) = &response.query {
                    view.log(format!("> QUERY: {}", query));
                }
                if let Some(answer) = &response.response {
                    view.log(format!("> RESPONSE: {}", answer));
                }
                view.log(format!("> RELEVANCE: {}", response.scores.relevance.reason));
                view.log(format!(
                    "> FAITHFULNESS: {}",
                    response.scores.faithfulness.reason
                ));
                if let Some(tokens) = response.metrics.token_summary() {
                    view.log(format!("> TOKENS: {}", tokens));
                }
                view.set_status(Status::Complete);
                Ok(response)
            }
            Err(e) => {
                error!(%run_id, "Audit failed: {}", e);
                view.log_failure(&e.to_string());
                view.set_status(Status::Retry);
                view.alert(format!("{}{}", message::AUDIT_FAILED_PREFIX, e));
                Err(e)
            }
        }
    }
}
