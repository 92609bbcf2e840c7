use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde_json::Value;
use submission_archive_core::contract::{
    parse_notification, HandlerResponse, StageResult, SubmissionNotification,
};
use tracing::{debug, error, info, info_span};

use crate::adapters::artifact_source::ArtifactSource;
use crate::adapters::audit_table::AuditTable;
use crate::adapters::clock::Clock;
use crate::adapters::mailer::Mailer;
use crate::adapters::object_store::ObjectStore;
use crate::config::PipelineConfig;
use crate::handlers::stages::{
    fetch_artifact, notify_recipient, record_audit, store_artifact, AuditEntry,
};

/// Capability objects built once at start-up and shared by every invocation.
#[derive(Clone, Copy)]
pub struct Capabilities<'a> {
    pub source: &'a dyn ArtifactSource,
    pub store: &'a dyn ObjectStore,
    pub mailer: &'a dyn Mailer,
    pub audit_table: &'a dyn AuditTable,
    pub clock: &'a dyn Clock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Fetching,
    Storing,
    Notifying,
    Recording,
    Done,
}

impl PipelineState {
    /// Every edge is unconditional except leaving `Fetching`, where a failed
    /// download skips straight to `Notifying`.
    pub fn next(self, outcome: &StageResult) -> Self {
        match self {
            Self::Fetching if outcome.is_success() => Self::Storing,
            Self::Fetching | Self::Storing => Self::Notifying,
            Self::Notifying => Self::Recording,
            Self::Recording | Self::Done => Self::Done,
        }
    }
}

/// Stage results of one run. `None` means the stage did not run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub state: PipelineState,
    pub fetch: Option<StageResult>,
    pub store: Option<StageResult>,
    pub notify: Option<StageResult>,
    pub record: Option<StageResult>,
}

impl PipelineOutcome {
    fn new() -> Self {
        Self {
            state: PipelineState::Fetching,
            fetch: None,
            store: None,
            notify: None,
            record: None,
        }
    }

    /// Combined fetch/store outcome: the store result when the store ran,
    /// otherwise the fetch result unchanged.
    pub fn download(&self) -> Option<&StageResult> {
        self.store.as_ref().or(self.fetch.as_ref())
    }
}

pub struct SubmissionPipeline<'a> {
    config: &'a PipelineConfig,
    capabilities: Capabilities<'a>,
}

impl<'a> SubmissionPipeline<'a> {
    pub fn new(config: &'a PipelineConfig, capabilities: Capabilities<'a>) -> Self {
        Self {
            config,
            capabilities,
        }
    }

    pub fn run(
        &self,
        notification: &SubmissionNotification,
        invocation_id: &str,
    ) -> PipelineOutcome {
        let mut outcome = PipelineOutcome::new();
        let mut artifact: Option<Vec<u8>> = None;

        while outcome.state != PipelineState::Done {
            let state = outcome.state;
            let result = match state {
                PipelineState::Fetching => {
                    let mut result =
                        fetch_artifact(self.capabilities.source, &notification.submission_url);
                    artifact = result.payload.take();
                    result
                }
                PipelineState::Storing => store_artifact(
                    self.capabilities.store,
                    self.capabilities.clock,
                    &self.config.bucket,
                    &notification.recipient_id,
                    artifact.as_deref().unwrap_or_default(),
                ),
                PipelineState::Notifying => {
                    let body = outcome
                        .download()
                        .map(|download| download.message.as_str())
                        .unwrap_or_default();
                    notify_recipient(
                        self.capabilities.mailer,
                        self.config,
                        &notification.recipient_id,
                        &self.config.subject,
                        body,
                    )
                }
                PipelineState::Recording => {
                    let email_status = outcome
                        .notify
                        .as_ref()
                        .map(|notify| notify.message.as_str())
                        .unwrap_or_default();
                    record_audit(
                        self.capabilities.audit_table,
                        self.capabilities.clock,
                        self.config,
                        AuditEntry {
                            invocation_id,
                            recipient_id: &notification.recipient_id,
                            subject: &self.config.subject,
                            submission_url: &notification.submission_url,
                            email_status,
                        },
                    )
                }
                PipelineState::Done => break,
            };

            let next = state.next(&result);
            debug!(from = ?state, to = ?next, status = result.status_code(), "pipeline transition");
            match state {
                PipelineState::Fetching => outcome.fetch = Some(result),
                PipelineState::Storing => outcome.store = Some(result),
                PipelineState::Notifying => outcome.notify = Some(result),
                PipelineState::Recording => outcome.record = Some(result),
                PipelineState::Done => {}
            }
            outcome.state = next;
        }

        outcome
    }
}

/// Entry point for one invocation.
///
/// Only a malformed event or a fault escaping the pipeline produce a 500.
/// Stage failures are reported to the recipient and the audit table, and the
/// invocation itself still succeeds.
pub fn handle_submission_event(
    event: &Value,
    invocation_id: &str,
    config: &PipelineConfig,
    capabilities: Capabilities<'_>,
) -> HandlerResponse {
    let notification = match parse_notification(event) {
        Ok(value) => value,
        Err(error) => {
            error!(invocation_id, %error, "rejected malformed submission event");
            return HandlerResponse::internal_error(error);
        }
    };

    let span = info_span!(
        "submission",
        invocation_id,
        recipient = %notification.recipient_id
    );
    let _entered = span.enter();

    let pipeline = SubmissionPipeline::new(config, capabilities);
    match panic::catch_unwind(AssertUnwindSafe(|| pipeline.run(&notification, invocation_id))) {
        Ok(outcome) => {
            info!(
                download_status = outcome.download().map(StageResult::status_code),
                notify_status = outcome.notify.as_ref().map(StageResult::status_code),
                record_status = outcome.record.as_ref().map(StageResult::status_code),
                "submission pipeline completed"
            );
            HandlerResponse::success()
        }
        Err(panic) => {
            let detail = panic_message(panic.as_ref());
            error!(%detail, "submission pipeline aborted");
            HandlerResponse::internal_error(detail)
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "pipeline panicked".to_string()
    }
}
