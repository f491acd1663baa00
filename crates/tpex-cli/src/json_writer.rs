//! JSON output: one document per suite, overwriting any previous run.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tpex_ado::{SuiteExtraction, TestCaseRecord};

/// Plan-level context, identical for every suite document in a run.
#[derive(Debug, Clone)]
pub struct PlanContext {
    pub plan_id: u64,
    pub plan_name: String,
    pub project: String,
}

/// The on-disk document for one suite.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteDocument {
    pub test_plan: PlanRef,
    pub project: String,
    pub suite: SuiteSection,
    pub summary: DocumentSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRef {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteSection {
    pub suite_id: u64,
    pub suite_name: String,
    pub test_cases: Vec<TestCaseRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub total_test_cases: usize,
    pub suite_id: u64,
    pub generated_at: String,
    pub has_errors: bool,
}

pub fn file_name(suite_id: u64) -> String {
    format!("Suite_{suite_id}_TestCases.json")
}

/// Assemble the document for one extraction.
pub fn document(plan: &PlanContext, extraction: &SuiteExtraction) -> SuiteDocument {
    SuiteDocument {
        test_plan: PlanRef {
            id: plan.plan_id,
            name: plan.plan_name.clone(),
        },
        project: plan.project.clone(),
        suite: SuiteSection {
            suite_id: extraction.suite_id,
            suite_name: extraction.suite_name.clone(),
            test_cases: extraction.test_cases.clone(),
        },
        summary: DocumentSummary {
            total_test_cases: extraction.test_cases.len(),
            suite_id: extraction.suite_id,
            generated_at: extraction.extracted_at.to_rfc3339(),
            has_errors: false,
        },
    }
}

/// Serialize one suite to `{dir}/Suite_{ID}_TestCases.json`.
pub fn write(plan: &PlanContext, extraction: &SuiteExtraction, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(file_name(extraction.suite_id));
    let body = serde_json::to_string_pretty(&document(plan, extraction))?;
    fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}
