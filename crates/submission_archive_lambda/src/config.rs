use submission_archive_core::contract::DEFAULT_NOTIFICATION_SUBJECT;
use thiserror::Error;

use crate::logging::LogFormat;

pub const DEFAULT_MAILGUN_API_BASE: &str = "https://api.mailgun.net";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be configured")]
    Missing(&'static str),
    #[error("{name} has unsupported value `{value}`")]
    Invalid { name: &'static str, value: String },
}

/// Values the pipeline needs per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub bucket: String,
    pub audit_table: String,
    pub mail_domain: String,
    pub sender: String,
    pub subject: String,
}

/// Process-wide configuration resolved once at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    pub pipeline: PipelineConfig,
    pub mailgun_api_key: String,
    pub mailgun_api_base: String,
    pub log_format: LogFormat,
}

impl HandlerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };
        let required = |name: &'static str| value(name).ok_or(ConfigError::Missing(name));

        let log_format = match value("LOG_FORMAT") {
            None => LogFormat::Json,
            Some(raw) => raw.parse::<LogFormat>().map_err(|_| ConfigError::Invalid {
                name: "LOG_FORMAT",
                value: raw,
            })?,
        };

        Ok(Self {
            pipeline: PipelineConfig {
                bucket: required("SUBMISSION_BUCKET")?,
                audit_table: required("EMAIL_AUDIT_TABLE")?,
                mail_domain: required("MAILGUN_DOMAIN")?,
                sender: required("SENDER_EMAIL")?,
                subject: value("NOTIFICATION_SUBJECT")
                    .unwrap_or_else(|| DEFAULT_NOTIFICATION_SUBJECT.to_string()),
            },
            mailgun_api_key: required("MAILGUN_API_KEY")?,
            mailgun_api_base: value("MAILGUN_API_BASE")
                .unwrap_or_else(|| DEFAULT_MAILGUN_API_BASE.to_string()),
            log_format,
        })
    }
}
