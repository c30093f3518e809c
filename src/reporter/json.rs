use crate::policy::AuditReport;
use crate::reporter::Reporter;

pub struct JsonReporter;

impl JsonReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for JsonReporter {
    fn report(&self, report: &AuditReport) -> String {
        serde_json::to_string_pretty(report)
            .unwrap_or_else(|e| format!(r#"{{"error": "Failed to serialize report: {}"}}"#, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{Finding, Summary};
    use std::path::Path;

    #[test]
    fn test_json_output_structure() {
        let findings = vec![
            Finding::error(Path::new("/tmp/a"), "world-writable file."),
            Finding::warning(Path::new("/tmp/b"), "group-writable file."),
        ];
        let summary = Summary::from_findings(&findings);
        let output = JsonReporter::new().report(&AuditReport { summary, findings });

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["summary"]["errors"], 1);
        assert_eq!(parsed["summary"]["warnings"], 1);
        assert_eq!(parsed["findings"][0]["severity"], "error");
        assert_eq!(parsed["findings"][0]["path"], "/tmp/a");
        assert_eq!(parsed["findings"][1]["message"], "group-writable file.");
    }

    #[test]
    fn test_json_output_empty_report() {
        let report = AuditReport {
            summary: Summary::from_findings(&[]),
            findings: vec![],
        };
        let output = JsonReporter::new().report(&report);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["findings"].as_array().unwrap().len(), 0);
    }
}
