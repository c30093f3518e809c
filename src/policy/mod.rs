pub mod evaluator;
pub mod magic;
pub mod types;

pub use evaluator::PolicyEngine;
pub use magic::{SniffVerdict, sniff};
pub use types::{AuditReport, AuditResult, EntryKind, Finding, Severity, Summary};
