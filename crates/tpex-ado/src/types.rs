use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Wire types ──

#[derive(Debug, Clone, Deserialize)]
pub struct SuiteDetail {
    pub id: u64,
    pub name: String,
}

/// Response body of the suite test-case list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TestCaseListResponse {
    #[serde(default)]
    pub value: Vec<TestCaseEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TestCaseEntry {
    #[serde(rename = "workItem")]
    pub work_item: Option<WorkItemRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkItemRef {
    pub id: u64,
}

/// Response body of the work-item batch endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkItemBatchResponse {
    #[serde(default)]
    pub value: Vec<WorkItem>,
}

/// One work item with its raw field map.
///
/// Fields are keyed by reference name (`System.Title`,
/// `Microsoft.VSTS.TCM.Steps`, `System.AssignedTo`, ...) and left as
/// untyped JSON: Azure DevOps varies the shape of several of them by API
/// version, so normalization happens in [`crate::fields`].
#[derive(Debug, Clone, Deserialize)]
pub struct WorkItem {
    pub id: u64,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

// ── Domain types ──

/// One extracted test case, flattened for output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseRecord {
    pub test_case_id: u64,
    pub test_case_name: String,
    pub number_of_steps: u32,
    pub assigned_to: String,
}

/// The normalized result of extracting one suite.
#[derive(Debug, Clone)]
pub struct SuiteExtraction {
    pub suite_id: u64,
    pub suite_name: String,
    pub test_cases: Vec<TestCaseRecord>,
    pub extracted_at: DateTime<Local>,
}

impl SuiteExtraction {
    /// A suite with zero test cases is a legitimate outcome, not an error.
    pub fn is_empty(&self) -> bool {
        self.test_cases.is_empty()
    }
}
