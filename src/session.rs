//! The audit session: reads pathnames, applies the policy, fixes modes.

use crate::error::{AuditError, Result};
use crate::mode::Mode;
use crate::policy::{AuditReport, AuditResult, EntryKind, Finding, PolicyEngine, Summary};
use std::ffi::OsString;
use std::fs;
use std::io::BufRead;
use std::os::unix::ffi::OsStringExt;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// How one run behaves: whether file content is consulted and how
/// aggressively modes are repaired. `fix` and `dry_run` count repeated
/// flags; a count of 2 or more also repairs warning-tier bits.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    pub content_check: bool,
    pub fix: u8,
    pub dry_run: u8,
}

impl SessionOptions {
    fn warn_tier(&self) -> bool {
        self.fix >= 2 || self.dry_run >= 2
    }
}

/// Owns one audit run: the engine, the remediation settings, and the
/// findings accumulated across all paths in emission order.
pub struct AuditSession {
    engine: PolicyEngine,
    options: SessionOptions,
    findings: Vec<Finding>,
}

impl AuditSession {
    pub fn new(options: SessionOptions) -> Self {
        Self {
            engine: PolicyEngine::new()
                .with_content_check(options.content_check)
                .with_wont_fix_notes(options.warn_tier()),
            options,
            findings: Vec::new(),
        }
    }

    /// Audit every newline-delimited pathname `input` yields. Pathnames are
    /// raw bytes; an embedded NUL aborts the whole run.
    pub fn run(&mut self, input: impl BufRead) -> Result<()> {
        for line in input.split(b'\n') {
            let line = line.map_err(AuditError::Input)?;
            if line.contains(&0) {
                return Err(AuditError::NulInInput);
            }
            let path = PathBuf::from(OsString::from_vec(line));
            self.audit_path(&path);
        }
        Ok(())
    }

    /// Audit a single path and, when remediation is requested, repair it.
    /// Filesystem failures become error findings; the session keeps going.
    pub fn audit_path(&mut self, path: &Path) {
        debug!(path = %path.display(), "auditing");

        let metadata = match fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(err) => {
                self.findings.push(Finding::error(path, err.to_string()));
                return;
            }
        };

        let kind = EntryKind::from_file_type(&metadata.file_type());
        let mode = Mode::new(metadata.permissions().mode());

        let AuditResult {
            findings,
            error_fixed,
            warn_fixed,
        } = self.engine.audit(path, kind, mode);
        self.findings.extend(findings);

        self.remediate(path, mode, error_fixed, warn_fixed);
    }

    fn remediate(&mut self, path: &Path, unfixed: Mode, error_fixed: Mode, warn_fixed: Mode) {
        if self.options.fix == 0 && self.options.dry_run == 0 {
            return;
        }

        let fixed = if self.options.warn_tier() {
            warn_fixed
        } else {
            error_fixed
        };
        if fixed == unfixed {
            return;
        }

        if self.options.dry_run > 0 {
            self.findings.push(Finding::note(
                path,
                format!("would fix permissions from {unfixed} to {fixed}."),
            ));
        } else if let Err(err) =
            fs::set_permissions(path, fs::Permissions::from_mode(fixed.bits()))
        {
            self.findings
                .push(Finding::error(path, format!("Cannot fix permissions: {err}.")));
        } else {
            debug!(path = %path.display(), %unfixed, %fixed, "rewrote permissions");
            self.findings.push(Finding::note(
                path,
                format!("fixed permissions from {unfixed} to {fixed}."),
            ));
        }
    }

    /// Consume the session and summarize everything it found.
    pub fn into_report(self) -> AuditReport {
        let summary = Summary::from_findings(&self.findings);
        AuditReport {
            summary,
            findings: self.findings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Severity;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn set_mode(path: &Path, bits: u32) {
        fs::set_permissions(path, fs::Permissions::from_mode(bits)).unwrap();
    }

    fn mode_of(path: &Path) -> u32 {
        fs::symlink_metadata(path).unwrap().permissions().mode() & 0o7777
    }

    #[test]
    fn test_clean_file_produces_no_findings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ok");
        fs::write(&path, b"data").unwrap();
        set_mode(&path, 0o644);

        let mut session = AuditSession::new(SessionOptions::default());
        session.audit_path(&path);
        let report = session.into_report();
        assert!(report.findings.is_empty());
        assert!(report.summary.passed(true));
    }

    #[test]
    fn test_missing_path_is_an_error_finding() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");

        let mut session = AuditSession::new(SessionOptions::default());
        session.audit_path(&missing);
        let report = session.into_report();
        assert_eq!(report.summary.errors, 1);
        assert_eq!(report.findings[0].severity, Severity::Error);
    }

    #[test]
    fn test_run_rejects_nul_in_input() {
        let mut session = AuditSession::new(SessionOptions::default());
        let err = session.run(Cursor::new(b"/tmp/a\0b\n".to_vec())).unwrap_err();
        assert!(matches!(err, AuditError::NulInInput));
    }

    #[test]
    fn test_run_continues_past_missing_paths() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good");
        fs::write(&good, b"data").unwrap();
        set_mode(&good, 0o666);

        let input = format!("{}\n{}\n", dir.path().join("missing").display(), good.display());
        let mut session = AuditSession::new(SessionOptions::default());
        session.run(Cursor::new(input.into_bytes())).unwrap();

        let report = session.into_report();
        // One lstat error plus the world-writable error on the real file.
        assert_eq!(report.summary.errors, 2);
    }

    #[test]
    fn test_non_utf8_paths_are_audited_not_fatal() {
        let dir = TempDir::new().unwrap();
        let name = OsString::from_vec(b"f\xff\xfe".to_vec());
        let loose = dir.path().join(&name);
        fs::write(&loose, b"data").unwrap();
        set_mode(&loose, 0o666);

        let mut input = Vec::new();
        input.extend_from_slice(b"/nonexistent/\xff\n");
        input.extend_from_slice(loose.as_os_str().as_encoded_bytes());
        input.push(b'\n');

        let mut session = AuditSession::new(SessionOptions::default());
        session.run(Cursor::new(input)).unwrap();

        let report = session.into_report();
        // One lstat error for the missing path, plus the world-writable
        // error on the real file; the raw bytes pass through untouched.
        assert_eq!(report.summary.errors, 2);
        assert_eq!(report.summary.warnings, 1);
        assert_eq!(report.findings[0].severity, Severity::Error);
        assert_eq!(
            report.findings[1].path.as_deref(),
            Some(loose.as_path())
        );
    }

    #[test]
    fn test_fix_rewrites_error_tier_bits() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("loose");
        fs::write(&path, b"data").unwrap();
        set_mode(&path, 0o666);

        let mut session = AuditSession::new(SessionOptions {
            fix: 1,
            ..Default::default()
        });
        session.audit_path(&path);

        assert_eq!(mode_of(&path), 0o664);
        let report = session.into_report();
        let note = report
            .findings
            .iter()
            .find(|f| f.severity == Severity::Note)
            .unwrap();
        assert_eq!(note.message, "fixed permissions from 0666 to 0664.");
    }

    #[test]
    fn test_double_fix_also_clears_warning_bits() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("loose");
        fs::write(&path, b"data").unwrap();
        set_mode(&path, 0o666);

        let mut session = AuditSession::new(SessionOptions {
            fix: 2,
            ..Default::default()
        });
        session.audit_path(&path);

        assert_eq!(mode_of(&path), 0o644);
    }

    #[test]
    fn test_dry_run_reports_without_touching() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("loose");
        fs::write(&path, b"data").unwrap();
        set_mode(&path, 0o666);

        let mut session = AuditSession::new(SessionOptions {
            dry_run: 1,
            ..Default::default()
        });
        session.audit_path(&path);

        assert_eq!(mode_of(&path), 0o666);
        let report = session.into_report();
        let note = report
            .findings
            .iter()
            .find(|f| f.severity == Severity::Note)
            .unwrap();
        assert_eq!(note.message, "would fix permissions from 0666 to 0664.");
    }

    #[test]
    fn test_no_remediation_note_when_nothing_to_fix() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("warned");
        fs::write(&path, b"data").unwrap();
        set_mode(&path, 0o664);

        // Tier 1 fixes errors only; a plain group-writable file stays put.
        let mut session = AuditSession::new(SessionOptions {
            fix: 1,
            ..Default::default()
        });
        session.audit_path(&path);

        assert_eq!(mode_of(&path), 0o664);
        let report = session.into_report();
        assert!(report
            .findings
            .iter()
            .all(|f| f.severity != Severity::Note));
    }

    #[test]
    fn test_symlink_is_judged_by_its_own_type() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("target");
        fs::write(&target, b"data").unwrap();
        set_mode(&target, 0o666);
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let mut session = AuditSession::new(SessionOptions::default());
        session.audit_path(&link);
        let report = session.into_report();
        assert!(report.findings.is_empty());
    }
}
