//! Interface to the USB device stack
//!
//! The stack owns enumeration, descriptors and the endpoint buffers. The
//! fightstick only selects an endpoint, asks whether it may move data, moves
//! it, and acknowledges the transaction.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// USB device lifecycle state as reported by the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DeviceState {
    #[default]
    Unattached,
    Powered,
    Default,
    Addressed,
    Configured,
    Suspended,
}

impl DeviceState {
    /// Interrupt endpoint traffic is only valid once the host selected a configuration.
    pub fn is_configured(self) -> bool {
        self == DeviceState::Configured
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndpointDirection {
    Out,
    In,
}

/// Endpoint address: bit 7 is the direction, bits 0–3 the endpoint number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointAddress(u8);

impl EndpointAddress {
    const DIRECTION_IN: u8 = 0x80;
    const NUMBER_MASK: u8 = 0x0F;

    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u8 {
        self.0
    }

    pub const fn number(self) -> u8 {
        self.0 & Self::NUMBER_MASK
    }

    pub const fn direction(self) -> EndpointDirection {
        if self.0 & Self::DIRECTION_IN != 0 {
            EndpointDirection::In
        } else {
            EndpointDirection::Out
        }
    }

    pub const fn is_control(self) -> bool {
        self.number() == 0
    }
}

impl fmt::Display for EndpointAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointType {
    Control,
    Isochronous,
    Bulk,
    Interrupt,
}

/// Parameters handed to the stack when an endpoint is provisioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointConfig {
    pub address: EndpointAddress,
    pub kind: EndpointType,
    pub size: u16,
    pub interval_ms: u8,
}

impl EndpointConfig {
    pub const fn interrupt(address: EndpointAddress, size: u16, interval_ms: u8) -> Self {
        Self {
            address,
            kind: EndpointType::Interrupt,
            size,
            interval_ms,
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    #[error("Endpoint stalled")]
    Stalled,

    #[error("Device disconnected")]
    Disconnected,

    #[error("Transfer timed out")]
    Timeout,

    #[error("Bus suspended")]
    BusSuspended,

    #[error("Host aborted the transfer")]
    HostAborted,
}

/// Endpoint primitives of a USB device stack.
///
/// Query methods take `&mut self` because they act on the currently selected
/// endpoint, which is itself transport state. None of the methods may block:
/// a primitive that cannot make progress reports so and the caller retries on
/// the next loop iteration.
pub trait UsbTransport {
    fn device_state(&self) -> DeviceState;

    fn select_endpoint(&mut self, address: EndpointAddress);

    /// A host packet is waiting in the selected OUT endpoint.
    fn is_out_received(&mut self) -> bool;

    /// The selected endpoint bank can be read or written right now.
    fn is_read_write_allowed(&mut self) -> bool;

    /// The selected IN endpoint has room for another packet.
    fn is_in_ready(&mut self) -> bool;

    fn read_stream(&mut self, buf: &mut [u8]) -> Result<(), TransportError>;

    fn write_stream(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Acknowledge the OUT transaction (or the OUT status stage on the control endpoint).
    fn clear_out(&mut self);

    /// Acknowledge the IN transaction (or the IN status stage on the control endpoint).
    fn clear_in(&mut self);

    /// Acknowledge the SETUP stage of a control request.
    fn clear_setup(&mut self);

    fn read_control_stream(&mut self, buf: &mut [u8]) -> Result<(), TransportError>;

    fn write_control_stream(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Provision one endpoint. Returns `false` when the stack rejects it.
    fn configure_endpoint(&mut self, config: EndpointConfig) -> bool;

    /// Stack housekeeping, run once per loop iteration after the exchange.
    fn usb_task(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_address_fields() {
        let address = EndpointAddress::new(0x81);
        assert_eq!(address.number(), 1);
        assert_eq!(address.direction(), EndpointDirection::In);
        assert!(!address.is_control());

        let address = EndpointAddress::new(0x02);
        assert_eq!(address.number(), 2);
        assert_eq!(address.direction(), EndpointDirection::Out);

        assert!(EndpointAddress::new(0x80).is_control());
    }

    #[test]
    fn test_endpoint_address_display() {
        assert_eq!(EndpointAddress::new(0x81).to_string(), "0x81");
        assert_eq!(EndpointAddress::new(0x02).to_string(), "0x02");
    }

    #[test]
    fn test_only_configured_state_is_configured() {
        let states = [
            DeviceState::Unattached,
            DeviceState::Powered,
            DeviceState::Default,
            DeviceState::Addressed,
            DeviceState::Suspended,
        ];
        for state in states {
            assert!(!state.is_configured(), "{state:?}");
        }
        assert!(DeviceState::Configured.is_configured());
        assert_eq!(DeviceState::default(), DeviceState::Unattached);
    }

    #[test]
    fn test_interrupt_config() {
        let config = EndpointConfig::interrupt(EndpointAddress::new(0x81), 5, 1);
        assert_eq!(config.kind, EndpointType::Interrupt);
        assert_eq!(config.size, 5);
        assert_eq!(config.interval_ms, 1);
    }
}
