//! Recording USB transport for tests and host-side simulation

use crate::{DeviceState, EndpointAddress, EndpointConfig, TransportError, UsbTransport};
use std::collections::VecDeque;

/// One primitive invoked on a [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    SelectEndpoint(EndpointAddress),
    IsOutReceived,
    IsReadWriteAllowed,
    IsInReady,
    ReadStream(usize),
    WriteStream(Vec<u8>),
    ClearOut,
    ClearIn,
    ClearSetup,
    ReadControlStream(usize),
    WriteControlStream(Vec<u8>),
    ConfigureEndpoint(EndpointConfig),
    UsbTask,
}

/// In-memory transport recording every call in order.
///
/// Host output packets are queued with [`queue_out_packet`](Self::queue_out_packet)
/// and stay pending until the device acknowledges them with `clear_out`, the
/// way an endpoint bank stays full until it is released.
#[derive(Debug, Clone)]
pub struct MockTransport {
    state: DeviceState,
    in_ready: bool,
    read_write_allowed: bool,
    pending_out: VecDeque<Vec<u8>>,
    control_out: Vec<u8>,
    stream_error: Option<TransportError>,
    rejected_endpoints: Vec<EndpointAddress>,
    calls: Vec<TransportCall>,
}

impl MockTransport {
    /// Unattached transport with a host that always has room.
    pub fn new() -> Self {
        Self {
            state: DeviceState::Unattached,
            in_ready: true,
            read_write_allowed: true,
            pending_out: VecDeque::new(),
            control_out: Vec::new(),
            stream_error: None,
            rejected_endpoints: Vec::new(),
            calls: Vec::new(),
        }
    }

    pub fn configured() -> Self {
        let mut transport = Self::new();
        transport.state = DeviceState::Configured;
        transport
    }

    pub fn set_state(&mut self, state: DeviceState) {
        self.state = state;
    }

    pub fn set_in_ready(&mut self, ready: bool) {
        self.in_ready = ready;
    }

    pub fn set_read_write_allowed(&mut self, allowed: bool) {
        self.read_write_allowed = allowed;
    }

    pub fn queue_out_packet(&mut self, data: Vec<u8>) {
        self.pending_out.push_back(data);
    }

    pub fn has_pending_out(&self) -> bool {
        !self.pending_out.is_empty()
    }

    /// Data stage the host sends with the next SET_REPORT.
    pub fn set_control_out_data(&mut self, data: Vec<u8>) {
        self.control_out = data;
    }

    /// Make every stream primitive fail with `error` until reset with `None`.
    pub fn fail_streams_with(&mut self, error: Option<TransportError>) {
        self.stream_error = error;
    }

    pub fn reject_endpoint(&mut self, address: EndpointAddress) {
        self.rejected_endpoints.push(address);
    }

    pub fn calls(&self) -> &[TransportCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<TransportCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn count(&self, call: &TransportCall) -> usize {
        self.calls.iter().filter(|recorded| *recorded == call).count()
    }

    /// Payloads written to interrupt IN endpoints.
    pub fn written_reports(&self) -> Vec<Vec<u8>> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                TransportCall::WriteStream(data) => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    /// Payloads sent in control data stages.
    pub fn control_writes(&self) -> Vec<Vec<u8>> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                TransportCall::WriteControlStream(data) => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    fn check_stream(&self) -> Result<(), TransportError> {
        match self.stream_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn fill_from(buf: &mut [u8], source: &[u8]) {
    for (dst, src) in buf.iter_mut().zip(source.iter().chain(std::iter::repeat(&0))) {
        *dst = *src;
    }
}

impl UsbTransport for MockTransport {
    fn device_state(&self) -> DeviceState {
        self.state
    }

    fn select_endpoint(&mut self, address: EndpointAddress) {
        self.calls.push(TransportCall::SelectEndpoint(address));
    }

    fn is_out_received(&mut self) -> bool {
        self.calls.push(TransportCall::IsOutReceived);
        self.has_pending_out()
    }

    fn is_read_write_allowed(&mut self) -> bool {
        self.calls.push(TransportCall::IsReadWriteAllowed);
        self.read_write_allowed
    }

    fn is_in_ready(&mut self) -> bool {
        self.calls.push(TransportCall::IsInReady);
        self.in_ready
    }

    fn read_stream(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        self.calls.push(TransportCall::ReadStream(buf.len()));
        self.check_stream()?;
        let packet = self.pending_out.front().map(Vec::as_slice).unwrap_or_default();
        fill_from(buf, packet);
        Ok(())
    }

    fn write_stream(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.calls.push(TransportCall::WriteStream(data.to_vec()));
        self.check_stream()
    }

    fn clear_out(&mut self) {
        self.calls.push(TransportCall::ClearOut);
        self.pending_out.pop_front();
    }

    fn clear_in(&mut self) {
        self.calls.push(TransportCall::ClearIn);
    }

    fn clear_setup(&mut self) {
        self.calls.push(TransportCall::ClearSetup);
    }

    fn read_control_stream(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        self.calls.push(TransportCall::ReadControlStream(buf.len()));
        self.check_stream()?;
        fill_from(buf, &self.control_out);
        Ok(())
    }

    fn write_control_stream(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.calls.push(TransportCall::WriteControlStream(data.to_vec()));
        self.check_stream()
    }

    fn configure_endpoint(&mut self, config: EndpointConfig) -> bool {
        self.calls.push(TransportCall::ConfigureEndpoint(config));
        !self.rejected_endpoints.contains(&config.address)
    }

    fn usb_task(&mut self) {
        self.calls.push(TransportCall::UsbTask);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_packet_stays_until_cleared() -> Result<(), TransportError> {
        let mut transport = MockTransport::configured();
        transport.queue_out_packet(vec![1, 2, 3]);
        assert!(transport.is_out_received());

        let mut buf = [0xFFu8; 8];
        transport.read_stream(&mut buf)?;
        assert_eq!(buf, [1, 2, 3, 0, 0, 0, 0, 0]);
        assert!(transport.is_out_received());

        transport.clear_out();
        assert!(!transport.is_out_received());
        Ok(())
    }

    #[test]
    fn test_stream_failure() {
        let mut transport = MockTransport::new();
        transport.fail_streams_with(Some(TransportError::Timeout));
        assert_eq!(transport.write_stream(&[0]), Err(TransportError::Timeout));
        transport.fail_streams_with(None);
        assert_eq!(transport.write_stream(&[0]), Ok(()));
        assert_eq!(transport.written_reports().len(), 2);
    }

    #[test]
    fn test_take_calls_drains() {
        let mut transport = MockTransport::new();
        transport.usb_task();
        assert_eq!(transport.take_calls(), vec![TransportCall::UsbTask]);
        assert!(transport.calls().is_empty());
    }
}
