pub mod cli;
pub mod error;
pub mod mode;
pub mod policy;
pub mod reporter;
pub mod session;

pub use cli::{Cli, OutputFormat};
pub use error::{AuditError, Result};
pub use mode::Mode;
pub use policy::{
    AuditReport, AuditResult, EntryKind, Finding, PolicyEngine, Severity, SniffVerdict, Summary,
};
pub use reporter::{Reporter, json::JsonReporter, terminal::TerminalReporter};
pub use session::{AuditSession, SessionOptions};
