use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_NOTIFICATION_SUBJECT: &str = "Assignment Download Status";
pub const NOTIFY_SUCCESS_STATUS: &str = "Success";
pub const NOTIFY_FAILURE_STATUS: &str = "Failed";
pub const HANDLER_SUCCESS_BODY: &str = "Success";

/// Typed notification decoded from the trigger payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmissionNotification {
    #[serde(rename = "submissionUrl")]
    pub submission_url: String,
    #[serde(rename = "recipientId")]
    pub recipient_id: String,
}

/// Raw message fields before required-field validation.
#[derive(Debug, Default, Deserialize)]
struct NotificationFields {
    #[serde(default, rename = "submission_url", alias = "submissionUrl")]
    submission_url: Option<String>,
    #[serde(default, rename = "emailID", alias = "recipientId")]
    recipient_id: Option<String>,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed event envelope: {0}")]
    InvalidEnvelope(String),
    #[error("notification message is not valid JSON: {0}")]
    InvalidMessage(#[from] serde_json::Error),
    #[error("notification is missing required field `{0}`")]
    MissingField(&'static str),
}

/// Decodes the submission notification carried by `event`.
///
/// SNS deliveries carry the notification as JSON text under
/// `Records[0].Sns.Message`. Direct invocations may pass the fields as a bare
/// object instead.
pub fn parse_notification(event: &Value) -> Result<SubmissionNotification, ParseError> {
    let message = extract_message(event)?;
    let fields: NotificationFields = serde_json::from_value(message)?;

    Ok(SubmissionNotification {
        submission_url: required(fields.submission_url, "submissionUrl")?,
        recipient_id: required(fields.recipient_id, "recipientId")?,
    })
}

fn extract_message(event: &Value) -> Result<Value, ParseError> {
    let Some(object) = event.as_object() else {
        return Err(ParseError::InvalidEnvelope(
            "event payload must be a JSON object".to_string(),
        ));
    };

    let Some(records) = object.get("Records") else {
        return Ok(event.clone());
    };

    let record = records
        .as_array()
        .and_then(|records| records.first())
        .ok_or_else(|| {
            ParseError::InvalidEnvelope("Records must be a non-empty array".to_string())
        })?;

    let message = record
        .get("Sns")
        .and_then(|sns| sns.get("Message"))
        .ok_or_else(|| ParseError::InvalidEnvelope("record is missing Sns.Message".to_string()))?;

    match message {
        Value::String(text) => Ok(serde_json::from_str(text)?),
        Value::Object(_) => Ok(message.clone()),
        _ => Err(ParseError::InvalidEnvelope(
            "Sns.Message must be JSON text".to_string(),
        )),
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ParseError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ParseError::MissingField(field)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Success,
    ClientError,
    InternalError,
}

impl StageStatus {
    pub fn status_code(self) -> u16 {
        match self {
            Self::Success => 200,
            Self::ClientError => 400,
            Self::InternalError => 500,
        }
    }
}

/// Uniform outcome of a pipeline stage. Stages report failures through this
/// value instead of returning errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageResult {
    pub status: StageStatus,
    pub message: String,
    pub payload: Option<Vec<u8>>,
}

impl StageResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: StageStatus::Success,
            message: message.into(),
            payload: None,
        }
    }

    pub fn client_error(message: impl Into<String>) -> Self {
        Self {
            status: StageStatus::ClientError,
            message: message.into(),
            payload: None,
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self {
            status: StageStatus::InternalError,
            message: message.into(),
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn status_code(&self) -> u16 {
        self.status.status_code()
    }

    pub fn is_success(&self) -> bool {
        self.status == StageStatus::Success
    }
}

/// One row in the email audit table, written once per invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub id: String,
    pub submission_url: String,
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub sent_at: String,
    pub email_status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HandlerResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl HandlerResponse {
    pub fn success() -> Self {
        Self {
            status_code: 200,
            body: HANDLER_SUCCESS_BODY.to_string(),
        }
    }

    pub fn internal_error(detail: impl std::fmt::Display) -> Self {
        Self {
            status_code: 500,
            body: format!("Internal Server Error: {detail}"),
        }
    }
}
