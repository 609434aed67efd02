//! HID class requests on the default control endpoint
//!
//! Only `GET_REPORT` and `SET_REPORT` addressed to the interface are answered
//! here. Everything else is left to the stack's standard request handling.

use crate::exchange::bump;
use crate::{FightstickDevice, InputSampler, OutputSink, UsbTransport};
use hid_fightstick_protocol::{INPUT_REPORT_SIZE, OUTPUT_REPORT_SIZE, OutputReport};
use tracing::{debug, trace};

/// HID class GET_REPORT request code.
pub const REQ_HID_GET_REPORT: u8 = 0x01;
/// HID class SET_REPORT request code.
pub const REQ_HID_SET_REPORT: u8 = 0x09;

/// HID report type carried in the high byte of `wValue`.
pub const HID_REPORT_TYPE_INPUT: u8 = 0x01;
pub const HID_REPORT_TYPE_OUTPUT: u8 = 0x02;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestDirection {
    HostToDevice,
    DeviceToHost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Standard,
    Class,
    Vendor,
    Reserved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestRecipient {
    Device,
    Interface,
    Endpoint,
    /// "Other" and every reserved recipient value.
    Other,
}

/// The 8-byte SETUP stage of a control transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupPacket {
    pub bm_request_type: u8,
    pub b_request: u8,
    pub w_value: u16,
    pub w_index: u16,
    pub w_length: u16,
}

impl SetupPacket {
    /// Parse the SETUP bytes as they arrive on the wire (little-endian words).
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        let [bm_request_type, b_request, v0, v1, i0, i1, l0, l1] = bytes;
        Self {
            bm_request_type,
            b_request,
            w_value: u16::from_le_bytes([v0, v1]),
            w_index: u16::from_le_bytes([i0, i1]),
            w_length: u16::from_le_bytes([l0, l1]),
        }
    }

    /// GET_REPORT for the input report of `interface`.
    pub fn get_input_report(interface: u16) -> Self {
        Self {
            bm_request_type: 0xA1,
            b_request: REQ_HID_GET_REPORT,
            w_value: u16::from(HID_REPORT_TYPE_INPUT) << 8,
            w_index: interface,
            w_length: INPUT_REPORT_SIZE as u16,
        }
    }

    /// SET_REPORT for the output report of `interface`.
    pub fn set_output_report(interface: u16) -> Self {
        Self {
            bm_request_type: 0x21,
            b_request: REQ_HID_SET_REPORT,
            w_value: u16::from(HID_REPORT_TYPE_OUTPUT) << 8,
            w_index: interface,
            w_length: OUTPUT_REPORT_SIZE as u16,
        }
    }

    pub fn direction(&self) -> RequestDirection {
        if self.bm_request_type & 0x80 != 0 {
            RequestDirection::DeviceToHost
        } else {
            RequestDirection::HostToDevice
        }
    }

    pub fn kind(&self) -> RequestKind {
        match (self.bm_request_type >> 5) & 0x03 {
            0 => RequestKind::Standard,
            1 => RequestKind::Class,
            2 => RequestKind::Vendor,
            _ => RequestKind::Reserved,
        }
    }

    pub fn recipient(&self) -> RequestRecipient {
        match self.bm_request_type & 0x1F {
            0 => RequestRecipient::Device,
            1 => RequestRecipient::Interface,
            2 => RequestRecipient::Endpoint,
            _ => RequestRecipient::Other,
        }
    }

    fn is_class_interface(&self, direction: RequestDirection) -> bool {
        self.direction() == direction
            && self.kind() == RequestKind::Class
            && self.recipient() == RequestRecipient::Interface
    }
}

/// Whether the request was consumed or should fall through to the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    Handled,
    Unhandled,
}

impl<T, S, O> FightstickDevice<T, S, O>
where
    T: UsbTransport,
    S: InputSampler,
    O: OutputSink,
{
    /// Answer a control request dispatched by the stack.
    ///
    /// The report sent for GET_REPORT is sampled at request time; the device
    /// keeps no report history. Trimming the data stage to `wLength` is up to
    /// the stack.
    pub fn handle_control_request(&mut self, packet: &SetupPacket) -> ControlOutcome {
        let outcome = match packet.b_request {
            REQ_HID_GET_REPORT if packet.is_class_interface(RequestDirection::DeviceToHost) => {
                self.answer_get_report();
                ControlOutcome::Handled
            }
            REQ_HID_SET_REPORT if packet.is_class_interface(RequestDirection::HostToDevice) => {
                self.absorb_set_report();
                ControlOutcome::Handled
            }
            _ => ControlOutcome::Unhandled,
        };

        match outcome {
            ControlOutcome::Handled => bump(&mut self.stats.control_requests_handled),
            ControlOutcome::Unhandled => {
                bump(&mut self.stats.control_requests_ignored);
                trace!(
                    "Control request 0x{:02X} (bmRequestType 0x{:02X}) left to the stack",
                    packet.b_request, packet.bm_request_type
                );
            }
        }
        outcome
    }

    fn answer_get_report(&mut self) {
        let bytes = self.current_report().to_bytes();

        self.transport.clear_setup();
        if let Err(err) = self.transport.write_control_stream(&bytes) {
            self.record_transport_error("GET_REPORT data stage", err);
        }
        self.transport.clear_out();
        debug!("GET_REPORT answered with {:02X?}", bytes);
    }

    fn absorb_set_report(&mut self) {
        let mut report = OutputReport::zeroed();

        self.transport.clear_setup();
        match self.transport.read_control_stream(report.as_mut_bytes()) {
            Ok(()) => self.sink.accept(&report),
            Err(err) => self.record_transport_error("SET_REPORT data stage", err),
        }
        self.transport.clear_in();
        debug!("SET_REPORT received {:02X?}", report.as_bytes());
    }
}
