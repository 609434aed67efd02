//! HID protocol implementation for the keypad fightstick
//!
//! This crate turns the 16-bit state of a shift-register keypad into the
//! gamepad input report a host sees, without touching any hardware.
//!
//! ## Features
//! - Fixed 5-byte input report (X, Y, hat, 16 buttons)
//! - Opposing-pair arbitration for the digital stick
//! - Declarative bit tables for axes and buttons
//! - Opaque 8-byte output report, accepted and discarded by the device
//! - Report descriptor matching the wire layout byte for byte

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod buttons;
pub mod descriptor;
pub mod input;
pub mod mapping;
pub mod output;

pub use buttons::*;
pub use descriptor::*;
pub use input::*;
pub use mapping::*;
pub use output::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Invalid report size: expected {expected}, got {actual}")]
    InvalidReportSize { expected: usize, actual: usize },

    #[error("Raw input bit {0} is out of range (0..16)")]
    BitOutOfRange(u8),

    #[error("Raw input bit {0} is bound more than once")]
    BitConflict(u8),

    #[error("Axis {axis:?} uses bit {bit} for both directions")]
    DegenerateAxis { axis: Axis, bit: u8 },

    #[error("Axis {0:?} is bound more than once")]
    DuplicateAxis(Axis),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Size of the input report on the wire: X, Y, hat, buttons (LE u16).
pub const INPUT_REPORT_SIZE: usize = 5;
/// Size of the host-to-device output report.
pub const OUTPUT_REPORT_SIZE: usize = 8;
/// Number of raw keypad bits sampled per poll.
pub const RAW_INPUT_BITS: usize = 16;

/// pid.codes open hardware vendor ID.
pub const VENDOR_ID: u16 = 0x1209;
/// pid.codes test product ID.
pub const PRODUCT_ID: u16 = 0x0001;

/// Interrupt IN endpoint carrying input reports (endpoint 1, device-to-host).
pub const IN_ENDPOINT_ADDRESS: u8 = 0x81;
/// Interrupt OUT endpoint carrying output reports (endpoint 2, host-to-device).
pub const OUT_ENDPOINT_ADDRESS: u8 = 0x02;
/// Polling interval of both interrupt endpoints, in frames.
pub const POLL_INTERVAL_MS: u8 = 1;
