// src/submit/client.rs

use reqwest::{
    blocking::Client,
    header::{ACCEPT, CONTENT_TYPE},
    redirect::Policy,
    StatusCode,
};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};
use url::Url;

use super::summary::ImportSummary;
use crate::payload::SubmissionPayload;

const JSON: &str = "application/json";

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("invalid server URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("server responded with {status}")]
    Status { status: StatusCode, body: String },
}

impl SubmitError {
    /// The server's reply, when there was one.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            SubmitError::Status { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// `{base}/dataValueSets`, with or without a trailing slash on `base`.
pub fn data_value_sets_url(base: &Url) -> Result<Url, SubmitError> {
    let joined = format!("{}/dataValueSets", base.as_str().trim_end_matches('/'));
    Url::parse(&joined).map_err(|source| SubmitError::InvalidUrl {
        url: joined,
        source,
    })
}

/// Posts one payload per call to a server's data value set import endpoint.
pub struct Submitter {
    client: Client,
    endpoint: Url,
    username: String,
    password: String,
}

impl Submitter {
    pub fn new(
        base_url: &Url,
        username: impl Into<String>,
        password: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SubmitError> {
        // a login-page redirect must not read as a successful import
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .build()
            .map_err(SubmitError::Client)?;

        Ok(Self {
            client,
            endpoint: data_value_sets_url(base_url)?,
            username: username.into(),
            password: password.into(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Send the payload once. Any non-2xx reply is an error carrying the body,
    /// which is empty if the reply could not be read in full.
    #[tracing::instrument(level = "info", skip(self, payload), fields(endpoint = %self.endpoint, values = payload.data_values.len()))]
    pub fn send(&self, payload: &SubmissionPayload) -> Result<ImportSummary, SubmitError> {
        let body = serde_json::to_vec(payload)?;

        let resp = self
            .client
            .post(self.endpoint.clone())
            .basic_auth(&self.username, Some(&self.password))
            .header(CONTENT_TYPE, JSON)
            .header(ACCEPT, JSON)
            .body(body)
            .send()
            .map_err(|source| SubmitError::Transport {
                url: self.endpoint.to_string(),
                source,
            })?;

        let status = resp.status();
        let text = resp.text();

        if !status.is_success() {
            // the status is the failure; a body cut short only loses detail
            let body = text.unwrap_or_else(|e| {
                warn!(error = %e, "could not read error response body");
                String::new()
            });
            return Err(SubmitError::Status { status, body });
        }

        let text = text.map_err(|source| SubmitError::Transport {
            url: self.endpoint.to_string(),
            source,
        })?;

        let summary = ImportSummary::parse(&text);
        if summary.has_errors() {
            warn!(
                status = summary.status.as_deref().unwrap_or("unknown"),
                conflicts = summary.conflicts.len(),
                "server accepted the request but reported problems"
            );
        }
        for conflict in &summary.conflicts {
            warn!(
                object = conflict.object.as_deref().unwrap_or("-"),
                value = conflict.value.as_deref().unwrap_or("-"),
                "import conflict"
            );
        }
        Ok(summary)
    }

    /// Send the payload and report the outcome as a boolean. Failures are
    /// logged together with the server's response body.
    pub fn submit(&self, payload: &SubmissionPayload) -> bool {
        match self.send(payload) {
            Ok(summary) => {
                info!(
                    status = summary.status.as_deref().unwrap_or("unknown"),
                    imported = summary.import_count.imported,
                    updated = summary.import_count.updated,
                    ignored = summary.import_count.ignored,
                    "aggregate data sent"
                );
                true
            }
            Err(e) => {
                match e.response_body() {
                    Some(body) => error!(error = %e, body, "sending aggregate data failed"),
                    None => error!(error = %e, "sending aggregate data failed"),
                }
                false
            }
        }
    }
}
