//! USB device runtime for the keypad fightstick
//!
//! This crate drives the interrupt endpoints and answers HID class control
//! requests on top of a USB device stack reached through [`UsbTransport`].
//! Report encoding lives in `hid-fightstick-protocol`; this crate only
//! decides when to sample, encode and move bytes.
//!
//! Everything runs on one cooperative loop. Each entry point takes
//! `&mut self`, so the endpoint buffers are never touched from two places
//! at once and no locking is needed.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod control;
pub mod device;
pub mod exchange;
pub mod mock;
pub mod sampler;
pub mod sink;
pub mod transport;

pub use config::*;
pub use control::*;
pub use device::*;
pub use exchange::*;
pub use sampler::*;
pub use sink::*;
pub use transport::*;

use hid_fightstick_protocol::ProtocolError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("Invalid device configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid input mapping: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Failed to configure {} of 2 interrupt endpoints", .failed.len())]
    EndpointProvisioning { failed: Vec<EndpointAddress> },
}

pub type DeviceResult<T> = Result<T, DeviceError>;
