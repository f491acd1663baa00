use crate::config::AdoConfig;
use crate::error::{AdoError, Result};
use crate::types::{SuiteDetail, TestCaseEntry, TestCaseListResponse, WorkItem, WorkItemBatchResponse};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

const API_VERSION: &str = "7.1";

/// Classification of an HTTP response status for the retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusClass {
    Success,
    /// 4xx: auth, permission, or a suite that does not exist. Retrying
    /// cannot help and must not be attempted.
    Permanent,
    /// 5xx and friends: worth another attempt within the budget.
    Transient,
}

pub(crate) fn classify_status(status: StatusCode) -> StatusClass {
    if status.is_success() {
        StatusClass::Success
    } else if status.is_client_error() {
        StatusClass::Permanent
    } else {
        StatusClass::Transient
    }
}

/// Authenticated client for the Azure DevOps REST API.
pub struct AdoApi {
    client: Client,
    config: AdoConfig,
    /// Total GETs issued, for debug logging only.
    requests: AtomicU64,
}

impl AdoApi {
    /// Create a new API client with configuration.
    pub fn new(config: AdoConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            config,
            requests: AtomicU64::new(0),
        })
    }

    /// Create an API client from environment variables.
    pub fn from_env() -> Result<Self> {
        let config = AdoConfig::from_env()?;
        Self::new(config)
    }

    pub fn config(&self) -> &AdoConfig {
        &self.config
    }

    /// Fetch detail (name, parent info) for one suite.
    pub async fn suite_detail(&self, suite_id: u64) -> Result<SuiteDetail> {
        self.get_json(
            &self.suite_detail_url(suite_id),
            &[("api-version", API_VERSION.to_string())],
        )
        .await
    }

    /// Fetch the test-case references assigned to one suite.
    pub async fn suite_test_case_entries(&self, suite_id: u64) -> Result<Vec<TestCaseEntry>> {
        let response: TestCaseListResponse = self
            .get_json(
                &self.test_case_list_url(suite_id),
                &[("api-version", API_VERSION.to_string())],
            )
            .await?;
        Ok(response.value)
    }

    /// Fetch full work items (all fields) for the given IDs in one batch.
    pub async fn work_items(&self, ids: &[u64]) -> Result<Vec<WorkItem>> {
        let ids_csv = ids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let response: WorkItemBatchResponse = self
            .get_json(
                &self.work_items_url(),
                &[
                    ("ids", ids_csv),
                    ("$expand", "all".to_string()),
                    ("api-version", API_VERSION.to_string()),
                ],
            )
            .await?;
        Ok(response.value)
    }

    /// Issue an authenticated GET with the bounded retry policy.
    ///
    /// Transient failures (timeout, connection error, 5xx) are retried with
    /// a fixed delay until the attempt budget runs out; 4xx responses fail
    /// immediately. A body that fails to decode on a 2xx response is also
    /// not retried: the bytes arrived, another request will not fix them.
    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            let request_number = self.requests.fetch_add(1, Ordering::Relaxed) + 1;
            debug!(request = request_number, attempt = attempts, url, "GET");

            let outcome = self
                .client
                .get(url)
                .basic_auth("", Some(&self.config.pat))
                .query(query)
                .send()
                .await;

            let last_error = match outcome {
                Ok(response) => {
                    let status = response.status();
                    match classify_status(status) {
                        StatusClass::Success => {
                            let body = response.text().await.map_err(AdoError::Http)?;
                            return serde_json::from_str(&body).map_err(|err| {
                                AdoError::Response(format!("{err} (from {url})"))
                            });
                        }
                        StatusClass::Permanent => {
                            let body = response.text().await.unwrap_or_default();
                            return Err(AdoError::Permanent {
                                status: status.as_u16(),
                                message: permanent_message(status, &body),
                            });
                        }
                        StatusClass::Transient => format!("server returned {status}"),
                    }
                }
                Err(source) if source.is_timeout() || source.is_connect() => source.to_string(),
                Err(source) => return Err(AdoError::Http(source)),
            };

            if attempts >= self.config.max_attempts {
                warn!(attempts, url, error = %last_error, "retry budget exhausted");
                return Err(AdoError::Exhausted {
                    attempts,
                    last_error,
                });
            }

            debug!(attempt = attempts, error = %last_error, "transient failure, retrying after delay");
            tokio::time::sleep(Duration::from_secs(self.config.retry_delay_seconds)).await;
        }
    }

    fn suite_detail_url(&self, suite_id: u64) -> String {
        format!(
            "{}/{}/{}/_apis/testplan/Plans/{}/Suites/{suite_id}",
            self.config.base_url, self.config.organization, self.config.project, self.config.plan_id
        )
    }

    fn test_case_list_url(&self, suite_id: u64) -> String {
        format!("{}/TestCase", self.suite_detail_url(suite_id))
    }

    // Work items live at organization scope, not under the project.
    fn work_items_url(&self) -> String {
        format!(
            "{}/{}/_apis/wit/workitems",
            self.config.base_url, self.config.organization
        )
    }
}

fn permanent_message(status: StatusCode, body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request rejected")
            .to_string()
    } else {
        // API error bodies can be large JSON blobs; keep the head.
        trimmed.chars().take(200).collect()
    }
}
