use crate::policy::{AuditReport, Finding, Severity};
use crate::reporter::Reporter;
use colored::Colorize;

/// Line-per-finding output: `severity: path: message`, plus a trailing
/// summary unless quiet.
pub struct TerminalReporter {
    quiet: bool,
}

impl TerminalReporter {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    fn severity_label(&self, severity: Severity) -> colored::ColoredString {
        match severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow(),
            Severity::Note => "note".cyan(),
        }
    }

    fn format_finding(&self, finding: &Finding) -> String {
        let label = self.severity_label(finding.severity);
        match &finding.path {
            Some(path) => format!("{}: {}: {}", label, path.display(), finding.message),
            None => format!("{}: {}", label, finding.message),
        }
    }
}

impl Reporter for TerminalReporter {
    fn report(&self, report: &AuditReport) -> String {
        let mut output = String::new();

        for finding in &report.findings {
            output.push_str(&self.format_finding(finding));
            output.push('\n');
        }

        let summary = &report.summary;
        if !self.quiet && (summary.errors != 0 || summary.warnings != 0) {
            output.push_str(&format!(
                "{} errors and {} warnings.\n",
                summary.errors, summary.warnings
            ));
        }

        output
    }
}
