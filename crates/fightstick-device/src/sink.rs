//! Destination for host output reports

use hid_fightstick_protocol::OutputReport;

/// Receives every output report the host sends.
///
/// The OUT transaction is acknowledged whatever the sink does with the report.
pub trait OutputSink {
    fn accept(&mut self, report: &OutputReport);
}

/// Sink that drops every report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscardOutput;

impl OutputSink for DiscardOutput {
    fn accept(&mut self, _report: &OutputReport) {}
}

impl OutputSink for Vec<OutputReport> {
    fn accept(&mut self, report: &OutputReport) {
        self.push(*report);
    }
}
