use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_s3::primitives::ByteStream;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use submission_archive_core::contract::{AuditRecord, HandlerResponse};
use submission_archive_lambda::adapters::artifact_source::HttpArtifactSource;
use submission_archive_lambda::adapters::audit_table::AuditTable;
use submission_archive_lambda::adapters::clock::SystemClock;
use submission_archive_lambda::adapters::mailer::MailgunMailer;
use submission_archive_lambda::adapters::object_store::ObjectStore;
use submission_archive_lambda::config::HandlerConfig;
use submission_archive_lambda::handlers::submission::{handle_submission_event, Capabilities};
use submission_archive_lambda::logging::init_logging;

struct S3ObjectStore {
    s3_client: aws_sdk_s3::Client,
}

impl ObjectStore for S3ObjectStore {
    fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), String> {
        let bucket = bucket.to_string();
        let object_key = key.to_string();
        let body_bytes = body.to_vec();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_object()
                    .bucket(bucket)
                    .key(object_key)
                    .content_type("application/zip")
                    .body(ByteStream::from(body_bytes))
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to write object to s3: {error}"))
            })
        })
    }
}

struct DynamoAuditTable {
    dynamodb_client: aws_sdk_dynamodb::Client,
}

impl AuditTable for DynamoAuditTable {
    fn put_record(&self, table: &str, record: &AuditRecord) -> Result<(), String> {
        let table_name = table.to_string();
        let item = audit_item(record);
        let client = self.dynamodb_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_item()
                    .table_name(table_name)
                    .set_item(Some(item))
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to put audit item to dynamodb: {error}"))
            })
        })
    }
}

fn audit_item(record: &AuditRecord) -> HashMap<String, AttributeValue> {
    [
        ("id", &record.id),
        ("submissionUrl", &record.submission_url),
        ("sender", &record.sender),
        ("recipient", &record.recipient),
        ("subject", &record.subject),
        ("sentAt", &record.sent_at),
        ("emailStatus", &record.email_status),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), AttributeValue::S(value.clone())))
    .collect()
}

struct RuntimeDependencies {
    config: HandlerConfig,
    source: HttpArtifactSource,
    store: S3ObjectStore,
    mailer: MailgunMailer,
    audit_table: DynamoAuditTable,
    clock: SystemClock,
}

impl RuntimeDependencies {
    async fn load(config: HandlerConfig) -> Result<Self, Error> {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let source = HttpArtifactSource::new()
            .map_err(|error| Error::from(format!("failed to build download client: {error}")))?;
        let mailer = MailgunMailer::new(&config.mailgun_api_base, &config.mailgun_api_key)
            .map_err(|error| Error::from(format!("failed to build mail client: {error}")))?;

        Ok(Self {
            source,
            store: S3ObjectStore {
                s3_client: aws_sdk_s3::Client::new(&aws_config),
            },
            mailer,
            audit_table: DynamoAuditTable {
                dynamodb_client: aws_sdk_dynamodb::Client::new(&aws_config),
            },
            clock: SystemClock,
            config,
        })
    }

    fn capabilities(&self) -> Capabilities<'_> {
        Capabilities {
            source: &self.source,
            store: &self.store,
            mailer: &self.mailer,
            audit_table: &self.audit_table,
            clock: &self.clock,
        }
    }
}

async fn handle_request(
    deps: &RuntimeDependencies,
    event: LambdaEvent<Value>,
) -> Result<HandlerResponse, Error> {
    Ok(handle_submission_event(
        &event.payload,
        &event.context.request_id,
        &deps.config.pipeline,
        deps.capabilities(),
    ))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = HandlerConfig::from_env().map_err(|error| Error::from(error.to_string()))?;
    init_logging(config.log_format);

    let deps = RuntimeDependencies::load(config).await?;
    let deps = &deps;
    lambda_runtime::run(service_fn(move |event| handle_request(deps, event))).await
}
