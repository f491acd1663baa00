use crate::api::AdoApi;
use crate::config::AdoConfig;
use crate::error::{AdoError, Result};
use crate::fields::{ASSIGNED_TO_FIELD, STEPS_FIELD, TITLE_FIELD, assigned_display_name, count_steps};
use crate::types::{SuiteExtraction, TestCaseRecord, WorkItem};
use async_trait::async_trait;
use chrono::Local;
use tracing::{debug, info, warn};

/// Anything that can turn a suite ID into a normalized extraction.
///
/// The production implementation is [`SuiteExtractor`]; the driver depends
/// on this trait so its loop can be exercised without a network.
#[async_trait]
pub trait SuiteSource: Send + Sync {
    async fn extract(&self, suite_id: u64) -> Result<SuiteExtraction>;
}

/// Extracts one suite's test cases through the Azure DevOps API.
pub struct SuiteExtractor {
    api: AdoApi,
}

impl SuiteExtractor {
    pub fn new(api: AdoApi) -> Self {
        Self { api }
    }

    /// Create an extractor from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(AdoApi::from_env()?))
    }

    pub fn config(&self) -> &AdoConfig {
        self.api.config()
    }
}

#[async_trait]
impl SuiteSource for SuiteExtractor {
    /// Extract one suite: metadata, test-case references, then one batch
    /// work-item fetch, normalized into [`TestCaseRecord`]s.
    ///
    /// A missing suite (404) fails the suite; any other metadata failure
    /// only costs the display name.
    async fn extract(&self, suite_id: u64) -> Result<SuiteExtraction> {
        let suite_name = match self.api.suite_detail(suite_id).await {
            Ok(detail) => detail.name,
            Err(err) if err.is_not_found() => return Err(suite_not_found(suite_id)),
            Err(err) => {
                warn!(suite_id, error = %err, "suite metadata fetch failed, continuing without name");
                "Unknown".to_string()
            }
        };

        let entries = self
            .api
            .suite_test_case_entries(suite_id)
            .await
            .map_err(|err| {
                if err.is_not_found() {
                    suite_not_found(suite_id)
                } else {
                    err
                }
            })?;

        let work_item_ids: Vec<u64> = entries
            .iter()
            .filter_map(|entry| entry.work_item.as_ref().map(|wi| wi.id))
            .collect();

        let test_cases = if work_item_ids.is_empty() {
            info!(suite_id, "suite has no test cases");
            Vec::new()
        } else {
            debug!(suite_id, count = work_item_ids.len(), "fetching work items");
            let work_items = self.api.work_items(&work_item_ids).await?;
            work_items.iter().map(normalize_work_item).collect()
        };

        info!(
            suite_id,
            suite_name = %suite_name,
            test_cases = test_cases.len(),
            "suite extracted"
        );

        Ok(SuiteExtraction {
            suite_id,
            suite_name,
            test_cases,
            extracted_at: Local::now(),
        })
    }
}

fn suite_not_found(suite_id: u64) -> AdoError {
    AdoError::Permanent {
        status: 404,
        message: format!("suite {suite_id} not found"),
    }
}

/// Flatten one work item into the record both writers consume.
fn normalize_work_item(item: &WorkItem) -> TestCaseRecord {
    let test_case_name = item
        .fields
        .get(TITLE_FIELD)
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .to_string();

    TestCaseRecord {
        test_case_id: item.id,
        test_case_name,
        number_of_steps: count_steps(item.fields.get(STEPS_FIELD)),
        assigned_to: assigned_display_name(item.fields.get(ASSIGNED_TO_FIELD)),
    }
}
