//! Network boundary: the workplace category list and application submission.
//!
//! Both calls are blocking and run off the UI thread (see
//! [`crate::application::jobs`]). There is no retry; a non-success status, a
//! timeout or an unreadable body is reported as a [`GatewayError`].

use crate::domain::ApplicationDraft;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_BASE_URL: &str = "https://dummyjson.com";
const CATEGORIES_PATH: &str = "/products/categories";
const SUBMIT_PATH: &str = "/products/add";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request timed out")]
    Timeout,
    #[error("API error: {0}")]
    Status(u16),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout
        } else if let Some(status) = err.status() {
            GatewayError::Status(status.as_u16())
        } else if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

pub trait Gateway: Send + Sync {
    fn fetch_categories(&self) -> Result<Vec<String>, GatewayError>;
    fn submit_application(
        &self,
        draft: &ApplicationDraft,
    ) -> Result<serde_json::Value, GatewayError>;
}

/// Body posted to the submission endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionPayload {
    pub title: String,
    pub description: String,
    pub price: u32,
    pub category: String,
}

impl From<&ApplicationDraft> for SubmissionPayload {
    fn from(draft: &ApplicationDraft) -> Self {
        Self {
            title: format!("{} {}", draft.first_name, draft.last_name),
            description: format!(
                "Loan application for {}$ for {} days",
                draft.amount, draft.term
            ),
            price: draft.amount,
            category: draft.workplace.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CategoryRecord {
    name: String,
}

pub struct HttpGateway {
    client: reqwest::blocking::Client,
    categories_url: String,
    submit_url: String,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        let base = base_url.trim_end_matches('/');
        Ok(Self {
            client,
            categories_url: format!("{base}{CATEGORIES_PATH}"),
            submit_url: format!("{base}{SUBMIT_PATH}"),
        })
    }
}

impl Gateway for HttpGateway {
    fn fetch_categories(&self) -> Result<Vec<String>, GatewayError> {
        tracing::info!(url = %self.categories_url, "fetching workplace categories");
        let response = self.client.get(&self.categories_url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status.as_u16()));
        }
        let records: Vec<CategoryRecord> = response.json()?;
        Ok(records.into_iter().map(|r| r.name).collect())
    }

    fn submit_application(
        &self,
        draft: &ApplicationDraft,
    ) -> Result<serde_json::Value, GatewayError> {
        let payload = SubmissionPayload::from(draft);
        tracing::info!(url = %self.submit_url, price = payload.price, "submitting loan application");
        let response = self.client.post(&self.submit_url).json(&payload).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status.as_u16()));
        }
        Ok(response.json()?)
    }
}
