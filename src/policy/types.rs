use crate::mode::Mode;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Note,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The file type of an audited entry, as seen by `lstat` (the final
/// symlink is never followed). Determines which rule subset applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    RegularFile,
    Directory,
    Symlink,
    Socket,
    DeviceSpecial,
    Fifo,
    Other,
}

impl EntryKind {
    pub fn from_file_type(file_type: &std::fs::FileType) -> Self {
        use std::os::unix::fs::FileTypeExt;

        if file_type.is_file() {
            EntryKind::RegularFile
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_socket() {
            EntryKind::Socket
        } else if file_type.is_char_device() || file_type.is_block_device() {
            EntryKind::DeviceSpecial
        } else if file_type.is_fifo() {
            EntryKind::Fifo
        } else {
            EntryKind::Other
        }
    }
}

/// One diagnostic about one path. Findings record what a fix would do;
/// they never change a mode themselves.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub message: String,
}

impl Finding {
    pub fn error(path: &Path, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            path: Some(path.to_path_buf()),
            message: message.into(),
        }
    }

    pub fn warning(path: &Path, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            path: Some(path.to_path_buf()),
            message: message.into(),
        }
    }

    pub fn note(path: &Path, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Note,
            path: Some(path.to_path_buf()),
            message: message.into(),
        }
    }
}

/// Outcome of auditing a single path: the findings in detection order and
/// the two remediation candidates derived from the snapshot.
#[derive(Debug, Clone)]
pub struct AuditResult {
    pub findings: Vec<Finding>,
    /// The snapshot with only error-tier bits repaired.
    pub error_fixed: Mode,
    /// The snapshot with error- and warning-tier bits repaired.
    pub warn_fixed: Mode,
}

impl AuditResult {
    /// A result with no findings and both candidates equal to the snapshot.
    pub fn clean(mode: Mode) -> Self {
        Self {
            findings: Vec::new(),
            error_fixed: mode,
            warn_fixed: mode,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
}

impl Summary {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let (errors, warnings) = findings
            .iter()
            .fold((0, 0), |(e, w), f| match f.severity {
                Severity::Error => (e + 1, w),
                Severity::Warning => (e, w + 1),
                Severity::Note => (e, w),
            });
        Self { errors, warnings }
    }

    /// Whether the run succeeds. Warnings only fail the run in strict mode.
    pub fn passed(&self, strict: bool) -> bool {
        self.errors == 0 && (!strict || self.warnings == 0)
    }
}

/// Everything one run produced, in emission order.
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub summary: Summary,
    pub findings: Vec<Finding>,
}
