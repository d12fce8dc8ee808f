//! Analysis policy loading and validation.
//!
//! A policy tunes the heuristics (tolerances, placeholder lists, scoring)
//! without changing what they mean. Policies are YAML or JSON documents
//! validated against an embedded JSON Schema.

mod parser;
mod schema;

pub use parser::{AnalysisPolicy, GenericValues, PolicyError, ScoringPolicy, SeverityWeights};
pub use schema::validate_policy_schema;
