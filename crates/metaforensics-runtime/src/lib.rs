//! # metaforensics-runtime
//!
//! Caller-side execution policy for metaforensics.
//!
//! The core analysis is synchronous and has no notion of time limits. This
//! crate runs it on tokio's blocking pool and adds:
//! - A wall-clock timeout per analysis, substituting a terminal report
//! - Fault isolation: a panicking analysis yields an error report
//! - Bounded-concurrency batch analysis that preserves input order
//!
//! ## Example
//!
//! ```rust,ignore
//! use metaforensics_runtime::{ForensicRuntime, RuntimeConfig};
//!
//! let runtime = ForensicRuntime::new(RuntimeConfig::default());
//! let report = runtime.analyze(record).await;
//!
//! if report.is_timeout() {
//!     eprintln!("{}", report.summary.message);
//! }
//! ```

pub mod batch;
pub mod config;
pub mod orchestrator;

pub use batch::{BatchReport, FileAnalysis, FileError, NamedRecord};
pub use config::RuntimeConfig;
pub use orchestrator::ForensicRuntime;

use thiserror::Error;

/// Errors from the runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Invalid runtime configuration: {0}")]
    Config(String),
}
