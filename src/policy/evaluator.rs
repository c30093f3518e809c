//! The per-kind permission rule set.
//!
//! Evaluation is a pure function from a mode snapshot to a list of findings
//! plus two remediation candidates: `error_fixed` repairs only error-tier
//! bits, `warn_fixed` additionally repairs warning-tier bits. The snapshot
//! itself is never mutated.

use crate::mode::{self, Mode};
use crate::policy::magic::{self, SniffVerdict};
use crate::policy::types::{AuditResult, EntryKind, Finding, Severity};
use std::path::Path;
use tracing::debug;

/// Applies the fixed permission policy to one filesystem entry at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyEngine {
    content_check: bool,
    announce_wont_fix: bool,
}

impl PolicyEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable content-based sniffing of executable bits.
    pub fn with_content_check(mut self, enabled: bool) -> Self {
        self.content_check = enabled;
        self
    }

    /// Emit a "won't fix this." note after warnings that remediation never
    /// touches. Enabled at the errors-and-warnings fix tier, where the
    /// silence would otherwise suggest the warning was repaired.
    pub fn with_wont_fix_notes(mut self, enabled: bool) -> Self {
        self.announce_wont_fix = enabled;
        self
    }

    /// Audit one entry, sniffing file content where the policy calls for it.
    pub fn audit(&self, path: &Path, kind: EntryKind, mode: Mode) -> AuditResult {
        let sniff = if self.content_check
            && kind == EntryKind::RegularFile
            && mode.intersects(mode::EXEC_ALL)
        {
            Some(magic::sniff(path, mode))
        } else {
            None
        };
        self.evaluate(path, kind, mode, sniff)
    }

    /// Pure rule evaluation; the sniffer verdict, if any, is passed in.
    pub fn evaluate(
        &self,
        path: &Path,
        kind: EntryKind,
        mode: Mode,
        sniff: Option<SniffVerdict>,
    ) -> AuditResult {
        debug!(path = %path.display(), ?kind, %mode, "evaluating");
        match kind {
            EntryKind::RegularFile => self.evaluate_file(path, mode, sniff),
            EntryKind::Directory => self.evaluate_directory(path, mode),
            EntryKind::Symlink
            | EntryKind::Socket
            | EntryKind::DeviceSpecial
            | EntryKind::Fifo => AuditResult::clean(mode),
            EntryKind::Other => AuditResult {
                findings: vec![Finding::warning(path, "unchecked file type.")],
                error_fixed: mode,
                warn_fixed: mode,
            },
        }
    }

    fn evaluate_file(&self, path: &Path, unfixed: Mode, sniff: Option<SniffVerdict>) -> AuditResult {
        let mut findings = Vec::new();
        let mut m = unfixed.bits();
        let mut error_fixed = m;
        let mut warn_fixed = m;
        let (u, g, o) = (unfixed.owner(), unfixed.group(), unfixed.other());

        if let Some(verdict) = sniff {
            findings.extend(verdict.findings);
            if verdict.clear_exec {
                m &= !mode::EXEC_ALL;
                warn_fixed &= !mode::EXEC_ALL;
            }
        }

        self.check_monotonicity(path, u, g, o, &mut m, &mut findings);

        if m & mode::SETID != 0 && m & mode::WRITE_ALL != 0 {
            findings.push(Finding::warning(
                path,
                "set-uid or set-gid files should not be writable by anyone.",
            ));
            warn_fixed &= !mode::WRITE_ALL;
        }

        // Whether the owner can write to their own file is not a security
        // concern.
        m &= !mode::OWNER_WRITE;

        if m & mode::GROUP_WRITE != 0 {
            if m & mode::SETID != 0 {
                findings.push(Finding::error(path, "group-writable set-uid/set-gid file."));
                error_fixed &= !mode::GROUP_WRITE;
            } else {
                findings.push(Finding::warning(path, "group-writable file."));
            }
            warn_fixed &= !mode::GROUP_WRITE;
            m &= !mode::GROUP_WRITE;
        }

        if m & mode::WORLD_WRITE != 0 {
            if m & mode::SETID != 0 {
                findings.push(Finding::error(path, "world-writable set-uid/set-gid file."));
            } else {
                findings.push(Finding::error(path, "world-writable file."));
            }
            m &= !mode::WORLD_WRITE;
            error_fixed &= !mode::WORLD_WRITE;
            warn_fixed &= !mode::WORLD_WRITE;
        }

        // Execute and set-id bits have been judged above.
        m &= !mode::EXEC_ALL;
        m &= !mode::SETID;

        check_residual(path, unfixed, m, "file", &mut findings);

        AuditResult {
            findings,
            error_fixed: Mode::new(error_fixed),
            warn_fixed: Mode::new(warn_fixed),
        }
    }

    fn evaluate_directory(&self, path: &Path, unfixed: Mode) -> AuditResult {
        let mut findings = Vec::new();
        let mut m = unfixed.bits();
        let mut error_fixed = m;
        let mut warn_fixed = m;
        let (u, g, o) = (unfixed.owner(), unfixed.group(), unfixed.other());

        // A class that can read or write a directory but not traverse it
        // got that way by mistake; both tiers repair the execute bit.
        for (class, name, exec_bit) in [
            (u, "owner", mode::OWNER_EXEC),
            (g, "group", mode::GROUP_EXEC),
            (o, "other", mode::WORLD_EXEC),
        ] {
            if class & 0o6 != 0 && class & 0o1 == 0 {
                findings.push(Finding::error(
                    path,
                    format!(
                        "inconsistent {} permissions ({}) for directory.",
                        name,
                        mode::triad(class)
                    ),
                ));
                error_fixed |= exec_bit;
                warn_fixed |= exec_bit;
            }
        }

        self.check_monotonicity(path, u, g, o, &mut m, &mut findings);

        m &= !mode::EXEC_ALL;
        m &= !mode::OWNER_WRITE;

        // Sticky directories with group or world write access are shared
        // work areas and accepted as-is.
        if m & mode::STICKY == 0 && m & mode::GROUP_WRITE != 0 {
            findings.push(Finding::warning(path, "group-writable directory."));
            warn_fixed &= !mode::GROUP_WRITE;
        }
        m &= !mode::GROUP_WRITE;

        if m & mode::STICKY == 0 && m & mode::WORLD_WRITE != 0 {
            findings.push(Finding::error(path, "world-writable directory."));
            error_fixed &= !mode::WORLD_WRITE;
            warn_fixed &= !mode::WORLD_WRITE;
        }
        m &= !mode::WORLD_WRITE;

        m &= !mode::STICKY;
        m &= !mode::SETGID;

        check_residual(path, unfixed, m, "directory", &mut findings);

        AuditResult {
            findings,
            error_fixed: Mode::new(error_fixed),
            warn_fixed: Mode::new(warn_fixed),
        }
    }

    /// A group right the owner lacks, or an other right the group lacks, is
    /// flagged but never auto-repaired; the higher bits are merged into the
    /// residual comparison copy so they are not reported twice.
    fn check_monotonicity(
        &self,
        path: &Path,
        u: u32,
        g: u32,
        o: u32,
        m: &mut u32,
        findings: &mut Vec<Finding>,
    ) {
        if g & !u != 0 {
            findings.push(Finding::warning(
                path,
                format!(
                    "group permissions ({}) are higher than owner permissions ({}).",
                    mode::triad(g),
                    mode::triad(u)
                ),
            ));
            self.push_wont_fix(findings);
            *m |= g << 6;
        }

        if o & !g != 0 {
            findings.push(Finding::warning(
                path,
                format!(
                    "other permissions ({}) are higher than group permissions ({}).",
                    mode::triad(o),
                    mode::triad(g)
                ),
            ));
            self.push_wont_fix(findings);
            *m |= o << 3;
        }
    }

    fn push_wont_fix(&self, findings: &mut Vec<Finding>) {
        if self.announce_wont_fix {
            findings.push(Finding {
                severity: Severity::Note,
                path: None,
                message: "won't fix this.".to_string(),
            });
        }
    }
}

/// After every bit the policy has an opinion on has been stripped, only a
/// handful of read-only patterns remain acceptable.
fn check_residual(
    path: &Path,
    unfixed: Mode,
    residual: u32,
    kind_name: &str,
    findings: &mut Vec<Finding>,
) {
    match residual {
        0o444 | 0o440 | 0o400 | 0o000 => {}
        _ => findings.push(Finding::warning(
            path,
            format!("unchecked mode {}/{:04o} for {}.", unfixed, residual, kind_name),
        )),
    }
}
