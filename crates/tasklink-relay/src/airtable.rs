//! Airtable sink: creates one table record per task command.
//!
//! `POST <apiBase>/<baseId>/<tableId>` with a Bearer token. Any status of
//! 300 or above is a failure; redirects are not followed.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error, warn};

use tasklink_core::config::AirtableConfig;
use tasklink_core::types::{RelayOutcome, TaskCommand};
use tasklink_core::utils::truncate_string;

use crate::traits::TaskSink;

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct CreateRecordRequest<'a> {
    fields: RecordFields<'a>,
}

#[derive(Debug, Serialize)]
struct RecordFields<'a> {
    #[serde(rename = "Task")]
    task: &'a str,
    #[serde(rename = "Deadline")]
    deadline: &'a str,
    #[serde(rename = "Assign To")]
    assign_to: &'a str,
    #[serde(rename = "Attachment")]
    attachment: [AttachmentRef<'a>; 1],
    #[serde(rename = "Description")]
    description: &'a str,
}

/// Attachment field entry; Airtable fetches the file from `url`.
#[derive(Debug, Serialize)]
struct AttachmentRef<'a> {
    url: &'a str,
}

impl<'a> From<&'a TaskCommand> for CreateRecordRequest<'a> {
    fn from(cmd: &'a TaskCommand) -> Self {
        CreateRecordRequest {
            fields: RecordFields {
                task: &cmd.task,
                deadline: &cmd.deadline,
                assign_to: &cmd.assign_to,
                attachment: [AttachmentRef {
                    url: &cmd.attachment,
                }],
                description: &cmd.description,
            },
        }
    }
}

// ─────────────────────────────────────────────
// AirtableSink
// ─────────────────────────────────────────────

/// Airtable REST client for a single table.
pub struct AirtableSink {
    client: reqwest::Client,
    /// Full record-creation URL.
    endpoint: String,
    api_key: String,
    /// Extra attempts after a connect failure.
    max_retries: u32,
}

impl AirtableSink {
    pub fn new(config: &AirtableConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout.max(1)))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("failed to build HTTP client")?;

        Ok(AirtableSink {
            client,
            endpoint: record_url(&config.api_base, &config.base_id, &config.table_id),
            api_key: config.api_key.clone(),
            max_retries: config.max_retries,
        })
    }

    async fn post_once(&self, body: &CreateRecordRequest<'_>) -> reqwest::Result<reqwest::Response> {
        self.client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
    }
}

/// `<base>/<baseId>/<tableId>`, tolerating a trailing slash on the base.
fn record_url(api_base: &str, base_id: &str, table_id: &str) -> String {
    format!("{}/{}/{}", api_base.trim_end_matches('/'), base_id, table_id)
}

/// Only failures that never reached the server are worth another attempt.
/// A timeout may fire after Airtable already created the record.
fn is_transient(err: &reqwest::Error) -> bool {
    err.is_connect()
}

#[async_trait]
impl TaskSink for AirtableSink {
    async fn submit(&self, command: &TaskCommand) -> RelayOutcome {
        let body = CreateRecordRequest::from(command);
        debug!(task = %command.task, endpoint = %self.endpoint, "creating airtable record");

        let mut attempt = 0;
        let response = loop {
            match self.post_once(&body).await {
                Ok(resp) => break resp,
                Err(e) if is_transient(&e) && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(error = %e, attempt, "airtable request failed, retrying");
                }
                Err(e) => {
                    error!(error = %e, task = %command.task, "airtable request failed");
                    return RelayOutcome::failure(e.to_string());
                }
            }
        };

        let status = response.status();
        if status.as_u16() >= 300 {
            let error_text = truncate_string(&response.text().await.unwrap_or_default(), 500);
            error!(status = %status, body = %error_text, task = %command.task, "airtable rejected record");
            return RelayOutcome::failure(format!("airtable error: {status}"));
        }

        debug!(status = %status, task = %command.task, "airtable record created");
        RelayOutcome::success(command)
    }

    fn display_name(&self) -> &str {
        "airtable"
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
