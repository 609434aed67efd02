//! Per-tick interrupt endpoint exchange
//!
//! Each poll drains a pending host output report from the OUT endpoint and,
//! when the host has room, writes one fresh input report to the IN endpoint.
//! Nothing here waits: anything that cannot happen now is retried next tick.

use crate::{FightstickDevice, InputSampler, OutputSink, TransportError, UsbTransport};
use hid_fightstick_protocol::OutputReport;
use serde::Serialize;
use tracing::{debug, trace};

/// Counters kept across polls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExchangeStats {
    pub polls: u64,
    pub unconfigured_skips: u64,
    pub out_packets_acknowledged: u64,
    pub out_reports_received: u64,
    pub reports_sent: u64,
    pub in_not_ready: u64,
    pub transport_errors: u64,
    pub control_requests_handled: u64,
    pub control_requests_ignored: u64,
}

pub(crate) fn bump(counter: &mut u64) {
    *counter = counter.saturating_add(1);
}

impl<T, S, O> FightstickDevice<T, S, O>
where
    T: UsbTransport,
    S: InputSampler,
    O: OutputSink,
{
    /// Service both interrupt endpoints once.
    ///
    /// Does nothing until the host has configured the device. Stream failures
    /// are logged and counted; the stack reports real link loss through its
    /// device state, which stops the next poll.
    pub fn poll(&mut self) {
        bump(&mut self.stats.polls);

        let state = self.transport.device_state();
        if !state.is_configured() {
            bump(&mut self.stats.unconfigured_skips);
            trace!("Poll skipped, device state {:?}", state);
            return;
        }

        self.service_out_endpoint();
        self.service_in_endpoint();
    }

    fn service_out_endpoint(&mut self) {
        self.transport.select_endpoint(self.config.out_endpoint);
        if !self.transport.is_out_received() {
            return;
        }

        if self.transport.is_read_write_allowed() {
            let mut report = OutputReport::zeroed();
            match self.transport.read_stream(report.as_mut_bytes()) {
                Ok(()) => {
                    self.sink.accept(&report);
                    bump(&mut self.stats.out_reports_received);
                    trace!("Output report received: {:02X?}", report.as_bytes());
                }
                Err(err) => self.record_transport_error("OUT report read", err),
            }
        }

        // The bank must be released even when nothing was readable, or the
        // endpoint stays NAKed.
        self.transport.clear_out();
        bump(&mut self.stats.out_packets_acknowledged);
    }

    fn service_in_endpoint(&mut self) {
        self.transport.select_endpoint(self.config.in_endpoint);
        if !self.transport.is_in_ready() {
            bump(&mut self.stats.in_not_ready);
            return;
        }

        let bytes = self.current_report().to_bytes();
        match self.transport.write_stream(&bytes) {
            Ok(()) => {
                bump(&mut self.stats.reports_sent);
                trace!("Input report sent: {:02X?}", bytes);
            }
            Err(err) => self.record_transport_error("IN report write", err),
        }
        self.transport.clear_in();
    }

    pub(crate) fn record_transport_error(&mut self, operation: &str, err: TransportError) {
        bump(&mut self.stats.transport_errors);
        debug!("{} failed: {}", operation, err);
    }
}
