//! The four pipeline stages. Each one reports through a [`StageResult`] and
//! never returns an error to its caller.

use submission_archive_core::contract::{
    AuditRecord, StageResult, NOTIFY_FAILURE_STATUS, NOTIFY_SUCCESS_STATUS,
};
use submission_archive_core::storage_keys::{audit_timestamp, submission_object_key};
use tracing::{error, info, warn};

use crate::adapters::artifact_source::ArtifactSource;
use crate::adapters::audit_table::AuditTable;
use crate::adapters::clock::Clock;
use crate::adapters::mailer::{Mailer, OutgoingEmail};
use crate::adapters::object_store::ObjectStore;
use crate::config::PipelineConfig;

pub const FETCH_REJECTED_MESSAGE: &str =
    "Unable to fetch the file. Please check your submission url and try again";
pub const RECORD_SUCCESS_MESSAGE: &str = "Updated email status in audit table";

/// Everything the audit row needs besides configuration and time.
#[derive(Debug, Clone, Copy)]
pub struct AuditEntry<'a> {
    pub invocation_id: &'a str,
    pub recipient_id: &'a str,
    pub subject: &'a str,
    pub submission_url: &'a str,
    pub email_status: &'a str,
}

pub fn fetch_artifact(source: &dyn ArtifactSource, url: &str) -> StageResult {
    match source.get(url) {
        Ok(artifact) if artifact.is_success() => {
            info!(
                stage = "fetch",
                status = artifact.status,
                bytes = artifact.body.len(),
                "downloaded submission artifact"
            );
            StageResult::success(format!(
                "Downloaded {} bytes from {url}",
                artifact.body.len()
            ))
            .with_payload(artifact.body)
        }
        Ok(artifact) => {
            warn!(
                stage = "fetch",
                status = artifact.status,
                url,
                "submission url answered with a non-success status"
            );
            StageResult::client_error(FETCH_REJECTED_MESSAGE)
        }
        Err(error) => {
            error!(stage = "fetch", url, %error, "submission download failed");
            StageResult::internal_error(format!(
                "Unable to download the file due to following error: {error}"
            ))
        }
    }
}

pub fn store_artifact(
    store: &dyn ObjectStore,
    clock: &dyn Clock,
    bucket: &str,
    recipient_id: &str,
    body: &[u8],
) -> StageResult {
    let key = submission_object_key(recipient_id, clock.now());

    match store.put_object(bucket, &key, body) {
        Ok(()) => {
            info!(stage = "store", bucket, key = %key, "archived submission artifact");
            StageResult::success(format!(
                "Successfully uploaded the file to bucket: {bucket}/{key}"
            ))
        }
        Err(error) => {
            error!(stage = "store", bucket, key = %key, %error, "archive write failed");
            StageResult::internal_error(format!(
                "Unable to upload the file due to following error: {error}"
            ))
        }
    }
}

/// Sends the status email. The detailed send error is logged but only the
/// generic status reaches the result.
pub fn notify_recipient(
    mailer: &dyn Mailer,
    config: &PipelineConfig,
    recipient_id: &str,
    subject: &str,
    body: &str,
) -> StageResult {
    let email = OutgoingEmail {
        from: config.sender.clone(),
        to: recipient_id.to_string(),
        subject: subject.to_string(),
        text: body.to_string(),
    };

    match mailer.send(&config.mail_domain, &email) {
        Ok(()) => {
            info!(stage = "notify", domain = %config.mail_domain, "status email sent");
            StageResult::success(NOTIFY_SUCCESS_STATUS)
        }
        Err(error) => {
            error!(stage = "notify", domain = %config.mail_domain, %error, "status email failed");
            StageResult::internal_error(NOTIFY_FAILURE_STATUS)
        }
    }
}

pub fn record_audit(
    table: &dyn AuditTable,
    clock: &dyn Clock,
    config: &PipelineConfig,
    entry: AuditEntry<'_>,
) -> StageResult {
    let record = AuditRecord {
        id: entry.invocation_id.to_string(),
        submission_url: entry.submission_url.to_string(),
        sender: config.sender.clone(),
        recipient: entry.recipient_id.to_string(),
        subject: entry.subject.to_string(),
        sent_at: audit_timestamp(clock.now()),
        email_status: entry.email_status.to_string(),
    };

    match table.put_record(&config.audit_table, &record) {
        Ok(()) => {
            info!(
                stage = "record",
                table = %config.audit_table,
                email_status = %record.email_status,
                "audit record written"
            );
            StageResult::success(RECORD_SUCCESS_MESSAGE)
        }
        Err(error) => {
            error!(stage = "record", table = %config.audit_table, %error, "audit write failed");
            StageResult::internal_error(format!(
                "Unable to record email status due to following error: {error}"
            ))
        }
    }
}
