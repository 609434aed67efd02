//! Device identity, endpoint layout and input mapping

use crate::{DeviceResult, EndpointAddress, EndpointConfig, EndpointDirection};
use hid_fightstick_protocol::{
    IN_ENDPOINT_ADDRESS, INPUT_REPORT_SIZE, InputMapping, OUT_ENDPOINT_ADDRESS,
    OUTPUT_REPORT_SIZE, POLL_INTERVAL_MS, PRODUCT_ID, VENDOR_ID,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Endpoint {address} must be an {expected:?} endpoint")]
    InvalidEndpointDirection {
        address: EndpointAddress,
        expected: EndpointDirection,
    },

    #[error("Endpoint number {0} is used more than once")]
    DuplicateEndpoint(u8),

    #[error("Endpoint {0} is the default control endpoint")]
    ControlEndpoint(EndpointAddress),

    #[error("Poll interval must be at least 1 ms, got {0}")]
    InvalidPollInterval(u8),

    #[error("Endpoint {address} holds {size} bytes but the report needs {required}")]
    EndpointTooSmall {
        address: EndpointAddress,
        size: u16,
        required: usize,
    },
}

/// Runtime configuration of a fightstick device.
///
/// Built in code or deserialized by the integrator; the crate itself reads
/// no files and no environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Vendor ID shown in lifecycle logs. The descriptors the host reads
    /// belong to the USB stack, which is not driven from here.
    pub vendor_id: u16,
    /// Product ID shown in lifecycle logs, like `vendor_id`.
    pub product_id: u16,
    pub in_endpoint: EndpointAddress,
    pub out_endpoint: EndpointAddress,
    pub poll_interval_ms: u8,
    pub in_endpoint_size: u16,
    pub out_endpoint_size: u16,
    pub mapping: InputMapping,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            vendor_id: VENDOR_ID,
            product_id: PRODUCT_ID,
            in_endpoint: EndpointAddress::new(IN_ENDPOINT_ADDRESS),
            out_endpoint: EndpointAddress::new(OUT_ENDPOINT_ADDRESS),
            poll_interval_ms: POLL_INTERVAL_MS,
            in_endpoint_size: INPUT_REPORT_SIZE as u16,
            out_endpoint_size: OUTPUT_REPORT_SIZE as u16,
            mapping: InputMapping::keypad(),
        }
    }
}

impl DeviceConfig {
    pub fn validate(&self) -> DeviceResult<()> {
        if self.in_endpoint.direction() != EndpointDirection::In {
            return Err(ConfigError::InvalidEndpointDirection {
                address: self.in_endpoint,
                expected: EndpointDirection::In,
            }
            .into());
        }
        if self.out_endpoint.direction() != EndpointDirection::Out {
            return Err(ConfigError::InvalidEndpointDirection {
                address: self.out_endpoint,
                expected: EndpointDirection::Out,
            }
            .into());
        }

        for address in [self.in_endpoint, self.out_endpoint] {
            if address.is_control() {
                return Err(ConfigError::ControlEndpoint(address).into());
            }
        }
        // One direction per endpoint number.
        if self.in_endpoint.number() == self.out_endpoint.number() {
            return Err(ConfigError::DuplicateEndpoint(self.in_endpoint.number()).into());
        }

        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidPollInterval(self.poll_interval_ms).into());
        }

        let sizes = [
            (self.in_endpoint, self.in_endpoint_size, INPUT_REPORT_SIZE),
            (self.out_endpoint, self.out_endpoint_size, OUTPUT_REPORT_SIZE),
        ];
        for (address, size, required) in sizes {
            if usize::from(size) < required {
                return Err(ConfigError::EndpointTooSmall {
                    address,
                    size,
                    required,
                }
                .into());
            }
        }

        self.mapping.validate()?;
        Ok(())
    }

    pub fn in_endpoint_config(&self) -> EndpointConfig {
        EndpointConfig::interrupt(self.in_endpoint, self.in_endpoint_size, self.poll_interval_ms)
    }

    pub fn out_endpoint_config(&self) -> EndpointConfig {
        EndpointConfig::interrupt(
            self.out_endpoint,
            self.out_endpoint_size,
            self.poll_interval_ms,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DeviceError;
    use hid_fightstick_protocol::ProtocolError;

    #[test]
    fn test_default_is_valid() -> Result<(), DeviceError> {
        let config = DeviceConfig::default();
        config.validate()?;
        assert_eq!(config.vendor_id, 0x1209);
        assert_eq!(config.in_endpoint.raw(), 0x81);
        assert_eq!(config.out_endpoint.raw(), 0x02);
        Ok(())
    }

    #[test]
    fn test_rejects_swapped_directions() {
        let config = DeviceConfig {
            in_endpoint: EndpointAddress::new(0x01),
            ..DeviceConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(DeviceError::Config(ConfigError::InvalidEndpointDirection {
                address: EndpointAddress::new(0x01),
                expected: EndpointDirection::In,
            }))
        );

        let config = DeviceConfig {
            out_endpoint: EndpointAddress::new(0x82),
            ..DeviceConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(DeviceError::Config(ConfigError::InvalidEndpointDirection { .. }))
        ));
    }

    #[test]
    fn test_rejects_shared_endpoint_number() {
        let config = DeviceConfig {
            out_endpoint: EndpointAddress::new(0x01),
            ..DeviceConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(DeviceError::Config(ConfigError::DuplicateEndpoint(1)))
        );
    }

    #[test]
    fn test_rejects_control_endpoint() {
        let config = DeviceConfig {
            out_endpoint: EndpointAddress::new(0x00),
            ..DeviceConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(DeviceError::Config(ConfigError::ControlEndpoint(
                EndpointAddress::new(0x00)
            )))
        );

        let config = DeviceConfig {
            in_endpoint: EndpointAddress::new(0x80),
            ..DeviceConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(DeviceError::Config(ConfigError::ControlEndpoint(
                EndpointAddress::new(0x80)
            )))
        );
    }

    #[test]
    fn test_rejects_zero_interval() {
        let config = DeviceConfig {
            poll_interval_ms: 0,
            ..DeviceConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(DeviceError::Config(ConfigError::InvalidPollInterval(0)))
        );
    }

    #[test]
    fn test_rejects_small_endpoint() {
        let config = DeviceConfig {
            out_endpoint_size: 4,
            ..DeviceConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(DeviceError::Config(ConfigError::EndpointTooSmall {
                address: EndpointAddress::new(0x02),
                size: 4,
                required: 8,
            }))
        );
    }

    #[test]
    fn test_rejects_bad_mapping_from_json() -> Result<(), serde_json::Error> {
        let config: DeviceConfig = serde_json::from_str(
            r#"{"mapping":{"axes":[],"buttons":[{"button":"home","bit":16}]}}"#,
        )?;
        assert_eq!(
            config.validate(),
            Err(DeviceError::Protocol(ProtocolError::BitOutOfRange(16)))
        );
        Ok(())
    }

    #[test]
    fn test_partial_json_uses_defaults() -> Result<(), serde_json::Error> {
        let config: DeviceConfig =
            serde_json::from_str(r#"{"product_id":4660,"in_endpoint":131}"#)?;
        assert_eq!(config.product_id, 0x1234);
        assert_eq!(config.in_endpoint.raw(), 0x83);
        assert_eq!(config.vendor_id, 0x1209);
        assert_eq!(config.mapping, InputMapping::keypad());
        Ok(())
    }

    #[test]
    fn test_identity_does_not_change_endpoints() -> Result<(), DeviceError> {
        let config = DeviceConfig {
            vendor_id: 0xFFFF,
            product_id: 0xFFFF,
            ..DeviceConfig::default()
        };
        config.validate()?;
        let default = DeviceConfig::default();
        assert_eq!(config.in_endpoint_config(), default.in_endpoint_config());
        assert_eq!(config.out_endpoint_config(), default.out_endpoint_config());
        Ok(())
    }

    #[test]
    fn test_endpoint_configs_follow_layout() {
        let config = DeviceConfig::default();
        let out = config.out_endpoint_config();
        assert_eq!(out.address.raw(), 0x02);
        assert_eq!(out.size, 8);
        assert_eq!(out.interval_ms, 1);
        assert_eq!(config.in_endpoint_config().size, 5);
    }
}
