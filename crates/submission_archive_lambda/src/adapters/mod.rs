pub mod artifact_source;
pub mod audit_table;
pub mod clock;
pub mod mailer;
pub mod object_store;
