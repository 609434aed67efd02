//! Host-to-device output report

use super::{OUTPUT_REPORT_SIZE, ProtocolError, ProtocolResult};

/// Output report sent by the host.
///
/// The device never interprets its contents; it only has to accept exactly
/// [`OUTPUT_REPORT_SIZE`] bytes so the transaction completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputReport {
    bytes: [u8; OUTPUT_REPORT_SIZE],
}

impl OutputReport {
    pub const fn zeroed() -> Self {
        Self {
            bytes: [0u8; OUTPUT_REPORT_SIZE],
        }
    }

    pub fn from_slice(data: &[u8]) -> ProtocolResult<Self> {
        let Ok(bytes) = <[u8; OUTPUT_REPORT_SIZE]>::try_from(data) else {
            return Err(ProtocolError::InvalidReportSize {
                expected: OUTPUT_REPORT_SIZE,
                actual: data.len(),
            });
        };
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8; OUTPUT_REPORT_SIZE] {
        &self.bytes
    }

    /// Receive buffer for a stream read.
    pub fn as_mut_bytes(&mut self) -> &mut [u8; OUTPUT_REPORT_SIZE] {
        &mut self.bytes
    }
}

static_assertions::const_assert_eq!(std::mem::size_of::<OutputReport>(), OUTPUT_REPORT_SIZE);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed() {
        assert_eq!(OutputReport::zeroed().as_bytes(), &[0u8; 8]);
        assert_eq!(OutputReport::default(), OutputReport::zeroed());
    }

    #[test]
    fn test_from_slice_exact() -> Result<(), ProtocolError> {
        let report = OutputReport::from_slice(&[1, 2, 3, 4, 5, 6, 7, 8])?;
        assert_eq!(report.as_bytes()[7], 8);
        Ok(())
    }

    #[test]
    fn test_from_slice_wrong_size() {
        assert_eq!(
            OutputReport::from_slice(&[0u8; 7]),
            Err(ProtocolError::InvalidReportSize {
                expected: 8,
                actual: 7
            })
        );
        assert!(OutputReport::from_slice(&[0u8; 9]).is_err());
    }

    #[test]
    fn test_receive_buffer_is_writable() {
        let mut report = OutputReport::zeroed();
        report.as_mut_bytes().copy_from_slice(&[0xAA; 8]);
        assert_eq!(report.as_bytes(), &[0xAA; 8]);
    }
}
