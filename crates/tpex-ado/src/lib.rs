//! Azure DevOps Test Plans client for tpex.
//!
//! This crate provides the pieces needed to pull test-case data for a test
//! suite out of Azure DevOps: configuration loaded from the environment, an
//! authenticated HTTP client with a bounded retry policy, and an extractor
//! that turns a suite ID into a normalized [`SuiteExtraction`].
//!
//! # Examples
//!
//! ```no_run
//! use tpex_ado::{SuiteExtractor, SuiteSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads AZURE_DEVOPS_PAT (and optional AZDO_* overrides) from the
//!     // environment.
//!     let extractor = SuiteExtractor::from_env()?;
//!
//!     let extraction = extractor.extract(1410044).await?;
//!     for tc in &extraction.test_cases {
//!         println!("{}: {} ({} steps)", tc.test_case_id, tc.test_case_name, tc.number_of_steps);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod extractor;
pub mod fields;
pub mod types;

// Re-export main types
pub use api::AdoApi;
pub use config::AdoConfig;
pub use error::{AdoError, Result};
pub use extractor::{SuiteExtractor, SuiteSource};
pub use types::{SuiteExtraction, TestCaseRecord};
