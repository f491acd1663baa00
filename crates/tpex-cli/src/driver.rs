//! The sequential extraction loop.
//!
//! One suite at a time, in input order: extract, write JSON, write Excel.
//! Suite-scoped failures of any kind are recorded and the loop moves on;
//! nothing here can abort the run.

use crate::excel_writer;
use crate::json_writer::{self, PlanContext};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::sleep;
use tpex_ado::SuiteSource;
use tracing::{info, warn};

/// Courtesy pause between suites; the API is rate limited.
const SUITE_PAUSE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct OutputTargets {
    pub json_dir: PathBuf,
    pub excel_dir: PathBuf,
    pub excel_enabled: bool,
    pub plan: PlanContext,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteStatus {
    Succeeded,
    SucceededEmpty,
    Failed,
}

#[derive(Debug, Clone)]
pub struct SuiteOutcome {
    pub suite_id: u64,
    pub status: SuiteStatus,
    pub test_case_count: usize,
    pub reason: Option<String>,
}

/// The run's tally: exactly one outcome per input suite ID.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<SuiteOutcome>,
}

impl RunSummary {
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.count(SuiteStatus::Succeeded)
    }

    pub fn succeeded_empty(&self) -> usize {
        self.count(SuiteStatus::SucceededEmpty)
    }

    pub fn failed(&self) -> usize {
        self.count(SuiteStatus::Failed)
    }

    pub fn total_test_cases(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status != SuiteStatus::Failed)
            .map(|o| o.test_case_count)
            .sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &SuiteOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status == SuiteStatus::Failed)
    }

    fn count(&self, status: SuiteStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// Human-readable end-of-run report.
    pub fn report(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", "=".repeat(50));
        let _ = writeln!(out, "EXTRACTION SUMMARY");
        let _ = writeln!(out, "  Suites attempted:     {}", self.attempted());
        let _ = writeln!(out, "  Succeeded:            {}", self.succeeded());
        let _ = writeln!(out, "  Succeeded (empty):    {}", self.succeeded_empty());
        let _ = writeln!(out, "  Failed:               {}", self.failed());
        let _ = writeln!(out, "  Test cases extracted: {}", self.total_test_cases());
        if self.failed() > 0 {
            let _ = writeln!(out, "Failed suites:");
            for outcome in self.failures() {
                let reason = outcome.reason.as_deref().unwrap_or("unknown");
                let _ = writeln!(out, "  {}: {reason}", outcome.suite_id);
            }
        }
        let _ = write!(out, "{}", "=".repeat(50));
        out
    }
}

/// Process every suite ID in order and return the tally.
pub async fn run(source: &dyn SuiteSource, suite_ids: &[u64], outputs: &OutputTargets) -> RunSummary {
    let mut summary = RunSummary::default();

    for (i, &suite_id) in suite_ids.iter().enumerate() {
        info!(suite_id, "processing suite");
        summary.outcomes.push(process_suite(source, suite_id, outputs).await);

        if i + 1 < suite_ids.len() {
            sleep(SUITE_PAUSE).await;
        }
    }

    summary
}

async fn process_suite(
    source: &dyn SuiteSource,
    suite_id: u64,
    outputs: &OutputTargets,
) -> SuiteOutcome {
    let extraction = match source.extract(suite_id).await {
        Ok(extraction) => extraction,
        Err(err) => {
            warn!(suite_id, error = %err, "suite extraction failed");
            return SuiteOutcome {
                suite_id,
                status: SuiteStatus::Failed,
                test_case_count: 0,
                reason: Some(err.to_string()),
            };
        }
    };

    // A failure of one output format must not block the other.
    let mut write_failures = Vec::new();

    match json_writer::write(&outputs.plan, &extraction, &outputs.json_dir) {
        Ok(path) => info!(suite_id, path = %path.display(), "wrote JSON"),
        Err(err) => {
            warn!(suite_id, error = %err, "JSON write failed");
            write_failures.push(format!("json write failed: {err}"));
        }
    }

    if outputs.excel_enabled {
        match excel_writer::write(&extraction, &outputs.excel_dir) {
            Ok(path) => info!(suite_id, path = %path.display(), "wrote Excel"),
            Err(err) => {
                warn!(suite_id, error = %err, "Excel write failed");
                write_failures.push(format!("excel write failed: {err}"));
            }
        }
    }

    let test_case_count = extraction.test_cases.len();
    if write_failures.is_empty() {
        SuiteOutcome {
            suite_id,
            status: if extraction.is_empty() {
                SuiteStatus::SucceededEmpty
            } else {
                SuiteStatus::Succeeded
            },
            test_case_count,
            reason: None,
        }
    } else {
        SuiteOutcome {
            suite_id,
            status: SuiteStatus::Failed,
            test_case_count,
            reason: Some(write_failures.join("; ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Local;
    use tempfile::TempDir;
    use tpex_ado::{AdoError, SuiteExtraction, TestCaseRecord};

    /// Canned source: the suite ID picks the scenario.
    struct StubSource;

    const OK_SUITE: u64 = 11;
    const EMPTY_SUITE: u64 = 12;
    const MISSING_SUITE: u64 = 404;
    const FLAKY_SUITE: u64 = 503;

    #[async_trait]
    impl SuiteSource for StubSource {
        async fn extract(&self, suite_id: u64) -> tpex_ado::Result<SuiteExtraction> {
            match suite_id {
                MISSING_SUITE => Err(AdoError::Permanent {
                    status: 404,
                    message: format!("suite {suite_id} not found"),
                }),
                FLAKY_SUITE => Err(AdoError::Exhausted {
                    attempts: 3,
                    last_error: "server returned 503 Service Unavailable".to_string(),
                }),
                EMPTY_SUITE => Ok(extraction(suite_id, 0)),
                _ => Ok(extraction(suite_id, 2)),
            }
        }
    }

    fn extraction(suite_id: u64, cases: usize) -> SuiteExtraction {
        SuiteExtraction {
            suite_id,
            suite_name: format!("Suite {suite_id}"),
            test_cases: (0..cases)
                .map(|i| TestCaseRecord {
                    test_case_id: suite_id * 100 + i as u64,
                    test_case_name: format!("case {i}"),
                    number_of_steps: i as u32,
                    assigned_to: String::new(),
                })
                .collect(),
            extracted_at: Local::now(),
        }
    }

    fn targets(json_dir: &std::path::Path, excel_dir: &std::path::Path) -> OutputTargets {
        OutputTargets {
            json_dir: json_dir.to_path_buf(),
            excel_dir: excel_dir.to_path_buf(),
            excel_enabled: false,
            plan: PlanContext {
                plan_id: 1,
                plan_name: "Plan".to_string(),
                project: "Proj".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_one_outcome_per_suite_in_input_order() {
        let temp_dir = TempDir::new().unwrap();
        let outputs = targets(temp_dir.path(), temp_dir.path());

        let ids = [OK_SUITE, EMPTY_SUITE, MISSING_SUITE, FLAKY_SUITE];
        let summary = run(&StubSource, &ids, &outputs).await;

        let outcome_ids: Vec<u64> = summary.outcomes.iter().map(|o| o.suite_id).collect();
        assert_eq!(outcome_ids, ids);

        let statuses: Vec<SuiteStatus> = summary.outcomes.iter().map(|o| o.status).collect();
        assert_eq!(
            statuses,
            [
                SuiteStatus::Succeeded,
                SuiteStatus::SucceededEmpty,
                SuiteStatus::Failed,
                SuiteStatus::Failed,
            ]
        );

        assert_eq!(summary.attempted(), 4);
        assert_eq!(summary.succeeded(), 1);
        assert_eq!(summary.succeeded_empty(), 1);
        assert_eq!(summary.failed(), 2);
        assert_eq!(summary.total_test_cases(), 2);
    }

    #[tokio::test]
    async fn test_failure_reasons_carry_cause() {
        let temp_dir = TempDir::new().unwrap();
        let outputs = targets(temp_dir.path(), temp_dir.path());

        let summary = run(&StubSource, &[MISSING_SUITE, FLAKY_SUITE], &outputs).await;

        let reasons: Vec<&str> = summary
            .failures()
            .map(|o| o.reason.as_deref().unwrap())
            .collect();
        assert!(reasons[0].contains("not found"), "reason: {}", reasons[0]);
        assert!(reasons[1].contains("3 attempts"), "reason: {}", reasons[1]);
    }

    #[tokio::test]
    async fn test_failed_suite_produces_no_files() {
        let temp_dir = TempDir::new().unwrap();
        let outputs = targets(temp_dir.path(), temp_dir.path());

        run(&StubSource, &[MISSING_SUITE], &outputs).await;

        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_empty_suite_still_writes_json() {
        let temp_dir = TempDir::new().unwrap();
        let outputs = targets(temp_dir.path(), temp_dir.path());

        let summary = run(&StubSource, &[EMPTY_SUITE], &outputs).await;
        assert_eq!(summary.outcomes[0].status, SuiteStatus::SucceededEmpty);

        let path = temp_dir.path().join("Suite_12_TestCases.json");
        let doc: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(doc["suite"]["testCases"].as_array().unwrap().len(), 0);
        assert_eq!(doc["summary"]["totalTestCases"], 0);
    }

    #[cfg(feature = "excel")]
    #[tokio::test]
    async fn test_json_write_failure_does_not_block_excel() {
        let temp_dir = TempDir::new().unwrap();
        // Nonexistent JSON directory forces a write error; Excel dir is fine.
        let mut outputs = targets(&temp_dir.path().join("missing"), temp_dir.path());
        outputs.excel_enabled = true;

        let summary = run(&StubSource, &[OK_SUITE], &outputs).await;

        let outcome = &summary.outcomes[0];
        assert_eq!(outcome.status, SuiteStatus::Failed);
        assert!(outcome.reason.as_deref().unwrap().contains("json write failed"));
        assert!(temp_dir.path().join("Suite_11_TestCases.xlsx").exists());
    }

    #[tokio::test]
    async fn test_report_lists_failures() {
        let temp_dir = TempDir::new().unwrap();
        let outputs = targets(temp_dir.path(), temp_dir.path());

        let summary = run(&StubSource, &[OK_SUITE, MISSING_SUITE], &outputs).await;
        let report = summary.report();
        assert!(report.contains("Suites attempted:     2"), "report:\n{report}");
        assert!(report.contains("404: "), "report:\n{report}");
        assert!(report.contains("not found"), "report:\n{report}");
    }
}
