//! Model Response Validation
//!
//! Two layers sit between a provider and an agent result:
//! - JSON repair for malformed responses (fences, trailing commas, truncation)
//! - Contract checks that read typed fields out of the repaired JSON and
//!   collect every violation before failing
//!
//! Repair is lenient, contract checks are strict: a response that parses but
//! lacks a required field is rejected.

mod contract;
mod json_repair;

pub use contract::{IssueSeverity, OutputReader, ValidationIssue};
pub use json_repair::{JsonRepairer, extract_json_from_response};
