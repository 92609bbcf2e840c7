//! In-memory capability fakes shared by the handler tests.

use std::sync::Mutex;

use chrono::{DateTime, Duration, TimeZone, Utc};
use submission_archive_core::contract::AuditRecord;

use crate::adapters::artifact_source::{ArtifactSource, FetchedArtifact};
use crate::adapters::audit_table::AuditTable;
use crate::adapters::clock::Clock;
use crate::adapters::mailer::{Mailer, OutgoingEmail};
use crate::adapters::object_store::ObjectStore;
use crate::config::PipelineConfig;

pub struct StubSource {
    response: Result<FetchedArtifact, String>,
    requests: Mutex<Vec<String>>,
}

impl StubSource {
    pub fn serving(body: &[u8]) -> Self {
        Self::with_response(Ok(FetchedArtifact {
            status: 200,
            body: body.to_vec(),
        }))
    }

    pub fn status(status: u16) -> Self {
        Self::with_response(Ok(FetchedArtifact {
            status,
            body: Vec::new(),
        }))
    }

    pub fn unreachable(error: &str) -> Self {
        Self::with_response(Err(error.to_string()))
    }

    fn with_response(response: Result<FetchedArtifact, String>) -> Self {
        Self {
            response,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("poisoned mutex").clone()
    }
}

impl ArtifactSource for StubSource {
    fn get(&self, url: &str) -> Result<FetchedArtifact, String> {
        self.requests
            .lock()
            .expect("poisoned mutex")
            .push(url.to_string());
        self.response.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bucket: String,
    pub key: String,
    pub body: Vec<u8>,
}

#[derive(Default)]
pub struct RecordingStore {
    writes: Mutex<Vec<StoredObject>>,
    failure: Option<String>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: &str) -> Self {
        Self {
            writes: Mutex::new(Vec::new()),
            failure: Some(error.to_string()),
        }
    }

    pub fn writes(&self) -> Vec<StoredObject> {
        self.writes.lock().expect("poisoned mutex").clone()
    }
}

impl ObjectStore for RecordingStore {
    fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), String> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        self.writes
            .lock()
            .expect("poisoned mutex")
            .push(StoredObject {
                bucket: bucket.to_string(),
                key: key.to_string(),
                body: body.to_vec(),
            });
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    attempts: Mutex<Vec<(String, OutgoingEmail)>>,
    failure: Option<String>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: &str) -> Self {
        Self {
            attempts: Mutex::new(Vec::new()),
            failure: Some(error.to_string()),
        }
    }

    /// Every send attempt, including the ones that failed.
    pub fn attempts(&self) -> Vec<(String, OutgoingEmail)> {
        self.attempts.lock().expect("poisoned mutex").clone()
    }
}

impl Mailer for RecordingMailer {
    fn send(&self, domain: &str, email: &OutgoingEmail) -> Result<(), String> {
        self.attempts
            .lock()
            .expect("poisoned mutex")
            .push((domain.to_string(), email.clone()));
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

pub struct PanickingMailer;

impl Mailer for PanickingMailer {
    fn send(&self, _domain: &str, _email: &OutgoingEmail) -> Result<(), String> {
        panic!("mail transport poisoned");
    }
}

#[derive(Default)]
pub struct RecordingTable {
    records: Mutex<Vec<(String, AuditRecord)>>,
    failure: Option<String>,
}

impl RecordingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: &str) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            failure: Some(error.to_string()),
        }
    }

    pub fn records(&self) -> Vec<(String, AuditRecord)> {
        self.records.lock().expect("poisoned mutex").clone()
    }
}

impl AuditTable for RecordingTable {
    fn put_record(&self, table: &str, record: &AuditRecord) -> Result<(), String> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        self.records
            .lock()
            .expect("poisoned mutex")
            .push((table.to_string(), record.clone()));
        Ok(())
    }
}

/// Returns `start`, then advances by `step` on every read.
pub struct SteppingClock {
    next: Mutex<DateTime<Utc>>,
    step: Duration,
}

impl SteppingClock {
    pub fn new(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            next: Mutex::new(start),
            step,
        }
    }

    pub fn fixed(start: DateTime<Utc>) -> Self {
        Self::new(start, Duration::zero())
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let mut next = self.next.lock().expect("poisoned mutex");
        let current = *next;
        *next = current + self.step;
        current
    }
}

pub fn sample_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 14, 9, 5, 7)
        .single()
        .expect("valid instant")
}

pub fn sample_config() -> PipelineConfig {
    PipelineConfig {
        bucket: "submission-archive".to_string(),
        audit_table: "email-audit".to_string(),
        mail_domain: "mg.example.com".to_string(),
        sender: "noreply@example.com".to_string(),
        subject: "Assignment Download Status".to_string(),
    }
}
