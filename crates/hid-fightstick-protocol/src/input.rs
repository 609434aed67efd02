//! Raw keypad state and the input report sent to the host

use super::{Buttons, INPUT_REPORT_SIZE, ProtocolError, ProtocolResult, RAW_INPUT_BITS};
use serde::{Deserialize, Serialize};

pub const AXIS_MIN: u8 = 0x00;
pub const AXIS_CENTER: u8 = 0x80;
pub const AXIS_MAX: u8 = 0xFF;

/// Hat null state; the hat switch is never driven by the keypad.
pub const HAT_NEUTRAL: u8 = 0x08;

/// One-hot value of each raw keypad bit, indexed by bit position.
///
/// Bits 0–12 are the original 13-bit keypad space. Bits 13–15 were found by
/// probing the shift registers and are kept as extension bits.
pub const BUTTON_MAP: [u16; RAW_INPUT_BITS] = [
    0x0001, 0x0002, 0x0004, 0x0008, 0x0010, 0x0020, 0x0040, 0x0080, 0x0100, 0x0200, 0x0400,
    0x0800, 0x1000, 0x2000, 0x4000, 0x8000,
];

/// Raw bits of the original keypad space.
pub const ORIGINAL_BITS_MASK: u16 = 0x1FFF;
/// Experimentally discovered bits beyond the original 13.
pub const EXTENSION_BITS_MASK: u16 = 0xE000;

/// Instantaneous state of the 16 keypad switches, one bit per switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawInputState(u16);

impl RawInputState {
    pub const IDLE: RawInputState = RawInputState(0);

    pub const fn new(bits: u16) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Whether keypad bit `bit` is closed. Bits past 15 read as open.
    pub fn is_set(self, bit: u8) -> bool {
        BUTTON_MAP
            .get(usize::from(bit))
            .is_some_and(|mask| self.0 & mask != 0)
    }

    pub fn with_bit(self, bit: u8) -> Self {
        match BUTTON_MAP.get(usize::from(bit)) {
            Some(mask) => Self(self.0 | mask),
            None => self,
        }
    }

    pub const fn extension_bits(self) -> u16 {
        self.0 & EXTENSION_BITS_MASK
    }

    /// Closed switches in ascending bit order.
    pub fn pressed_bits(self) -> impl Iterator<Item = u8> {
        (0u8..16).filter(move |&bit| self.is_set(bit))
    }
}

impl From<u16> for RawInputState {
    fn from(bits: u16) -> Self {
        Self(bits)
    }
}

impl From<RawInputState> for u16 {
    fn from(state: RawInputState) -> Self {
        state.0
    }
}

/// Gamepad input report as seen by the host.
///
/// # Wire layout
///
/// | Offset | Size | Field        |
/// |--------|------|--------------|
/// | 0      | 1    | axis_x       |
/// | 1      | 1    | axis_y       |
/// | 2      | 1    | hat          |
/// | 3      | 2    | buttons (LE) |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputReport {
    pub axis_x: u8,
    pub axis_y: u8,
    pub hat: u8,
    pub buttons: Buttons,
}

impl InputReport {
    /// Stick centred, hat released, no buttons.
    pub const fn neutral() -> Self {
        Self {
            axis_x: AXIS_CENTER,
            axis_y: AXIS_CENTER,
            hat: HAT_NEUTRAL,
            buttons: Buttons::empty(),
        }
    }

    pub fn to_bytes(&self) -> [u8; INPUT_REPORT_SIZE] {
        let [lo, hi] = self.buttons.bits().to_le_bytes();
        [self.axis_x, self.axis_y, self.hat, lo, hi]
    }

    pub fn from_bytes(data: &[u8]) -> ProtocolResult<Self> {
        let [axis_x, axis_y, hat, lo, hi, ..] = *data else {
            return Err(ProtocolError::InvalidReportSize {
                expected: INPUT_REPORT_SIZE,
                actual: data.len(),
            });
        };

        Ok(Self {
            axis_x,
            axis_y,
            hat,
            buttons: Buttons::from_bits_retain(u16::from_le_bytes([lo, hi])),
        })
    }

    pub fn button(&self, button: Buttons) -> bool {
        self.buttons.contains(button)
    }

    pub fn button_count(&self) -> usize {
        self.buttons.bits().count_ones() as usize
    }

    pub fn is_neutral(&self) -> bool {
        *self == Self::neutral()
    }
}

impl Default for InputReport {
    fn default() -> Self {
        Self::neutral()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_map_is_one_hot() {
        for (bit, mask) in BUTTON_MAP.iter().enumerate() {
            assert_eq!(*mask, 1u16 << bit);
        }
    }

    #[test]
    fn test_original_and_extension_masks_partition() {
        assert_eq!(ORIGINAL_BITS_MASK & EXTENSION_BITS_MASK, 0);
        assert_eq!(ORIGINAL_BITS_MASK | EXTENSION_BITS_MASK, u16::MAX);
        assert_eq!(EXTENSION_BITS_MASK.count_ones(), 3);
    }

    #[test]
    fn test_raw_bit_access() {
        let raw = RawInputState::new(0x0204);
        assert!(raw.is_set(2));
        assert!(raw.is_set(9));
        assert!(!raw.is_set(0));
        assert!(!raw.is_set(16));
        assert_eq!(raw.pressed_bits().collect::<Vec<_>>(), vec![2, 9]);
    }

    #[test]
    fn test_with_bit_out_of_range_is_noop() {
        let raw = RawInputState::IDLE.with_bit(3).with_bit(40);
        assert_eq!(raw.bits(), 0x0008);
    }

    #[test]
    fn test_extension_bits() {
        assert_eq!(RawInputState::new(0xFFFF).extension_bits(), 0xE000);
        assert_eq!(RawInputState::new(0x1FFF).extension_bits(), 0);
    }

    #[test]
    fn test_neutral_report_bytes() {
        let report = InputReport::neutral();
        assert_eq!(report.to_bytes(), [0x80, 0x80, 0x08, 0x00, 0x00]);
        assert!(report.is_neutral());
    }

    #[test]
    fn test_buttons_are_little_endian() {
        let report = InputReport {
            buttons: Buttons::L | Buttons::HOME,
            ..InputReport::neutral()
        };
        let bytes = report.to_bytes();
        assert_eq!(bytes[3], 0x10);
        assert_eq!(bytes[4], 0x10);
    }

    #[test]
    fn test_from_bytes() -> Result<(), ProtocolError> {
        let report = InputReport::from_bytes(&[0x00, 0xFF, 0x08, 0x04, 0x02])?;
        assert_eq!(report.axis_x, AXIS_MIN);
        assert_eq!(report.axis_y, AXIS_MAX);
        assert_eq!(report.buttons, Buttons::A | Buttons::PLUS);
        assert_eq!(report.button_count(), 2);
        Ok(())
    }

    #[test]
    fn test_from_bytes_short() {
        let result = InputReport::from_bytes(&[0x80, 0x80]);
        assert_eq!(
            result,
            Err(ProtocolError::InvalidReportSize {
                expected: 5,
                actual: 2
            })
        );
    }
}
