pub mod json;
pub mod terminal;

use crate::policy::AuditReport;

pub trait Reporter {
    fn report(&self, report: &AuditReport) -> String;
}
