//! Declarative keypad-to-report mapping and the report encoder
//!
//! The physical keypad wires twelve switches to raw bits:
//!
//! ```text
//! +-----------+----+----+----+----+----+----+---+---+---+---+---+---+---+---+---+---+
//! | Bit Pos   | 15 | 14 | 13 | 12 | 11 | 10 | 9 | 8 | 7 | 6 | 5 | 4 | 3 | 2 | 1 | 0 |
//! | Keypad    |    |    |    |    | 3  | 6  | 9 | # | 2 | 5 | 8 | 0 | 1 | 4 | 7 | * |
//! | Gamepad   |    |    |    |    | X  | →  | A | R | ↑ | ⌂ | ↓ | + | Y | ← | B | L |
//! +-----------+----+----+----+----+----+----+---+---+---+---+---+---+---+---+---+---+
//! ```
//!
//! Each stick axis is driven by an opposing pair of bits. When both halves of
//! a pair are closed they cancel and the axis stays centred.

use super::{
    AXIS_CENTER, AXIS_MAX, AXIS_MIN, Buttons, EXTENSION_BITS_MASK, InputReport, ProtocolError,
    ProtocolResult, RAW_INPUT_BITS, RawInputState, SwitchButton,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    X,
    Y,
}

/// Two raw bits driving one axis towards its minimum and maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisBinding {
    pub axis: Axis,
    pub negative_bit: u8,
    pub positive_bit: u8,
}

impl AxisBinding {
    pub const fn new(axis: Axis, negative_bit: u8, positive_bit: u8) -> Self {
        Self {
            axis,
            negative_bit,
            positive_bit,
        }
    }

    /// Opposing-pair arbitration: a lone half wins, both or neither centre.
    pub fn resolve(&self, raw: RawInputState) -> u8 {
        match (raw.is_set(self.negative_bit), raw.is_set(self.positive_bit)) {
            (true, false) => AXIS_MIN,
            (false, true) => AXIS_MAX,
            _ => AXIS_CENTER,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonBinding {
    pub button: SwitchButton,
    pub bit: u8,
}

impl ButtonBinding {
    pub const fn new(button: SwitchButton, bit: u8) -> Self {
        Self { button, bit }
    }
}

pub const KEYPAD_AXES: [AxisBinding; 2] = [
    AxisBinding::new(Axis::X, 2, 10),
    AxisBinding::new(Axis::Y, 7, 5),
];

pub const KEYPAD_BUTTONS: [ButtonBinding; 8] = [
    ButtonBinding::new(SwitchButton::L, 0),
    ButtonBinding::new(SwitchButton::B, 1),
    ButtonBinding::new(SwitchButton::Y, 3),
    ButtonBinding::new(SwitchButton::Plus, 4),
    ButtonBinding::new(SwitchButton::Home, 6),
    ButtonBinding::new(SwitchButton::R, 8),
    ButtonBinding::new(SwitchButton::A, 9),
    ButtonBinding::new(SwitchButton::X, 11),
];

/// Bit tables consulted by the encoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputMapping {
    axes: Vec<AxisBinding>,
    buttons: Vec<ButtonBinding>,
}

impl InputMapping {
    /// Validate and build a custom mapping.
    pub fn new(axes: Vec<AxisBinding>, buttons: Vec<ButtonBinding>) -> ProtocolResult<Self> {
        let mapping = Self { axes, buttons };
        mapping.validate()?;
        Ok(mapping)
    }

    /// Check the bit tables.
    ///
    /// Every bit must be below 16 and may be bound once, and each axis may be
    /// driven by a single pair. Binding one of the
    /// extension bits is allowed and treated as a protocol extension. Tables
    /// deserialized from a config file should be checked with this before use.
    pub fn validate(&self) -> ProtocolResult<()> {
        let mut used = 0u16;
        let mut claim = |bit: u8| -> ProtocolResult<()> {
            if usize::from(bit) >= RAW_INPUT_BITS {
                return Err(ProtocolError::BitOutOfRange(bit));
            }
            let mask = 1u16 << bit;
            if used & mask != 0 {
                return Err(ProtocolError::BitConflict(bit));
            }
            used |= mask;
            Ok(())
        };

        let mut bound_axes: Vec<Axis> = Vec::with_capacity(self.axes.len());
        for binding in &self.axes {
            if bound_axes.contains(&binding.axis) {
                return Err(ProtocolError::DuplicateAxis(binding.axis));
            }
            bound_axes.push(binding.axis);
            if binding.negative_bit == binding.positive_bit {
                return Err(ProtocolError::DegenerateAxis {
                    axis: binding.axis,
                    bit: binding.negative_bit,
                });
            }
            claim(binding.negative_bit)?;
            claim(binding.positive_bit)?;
        }
        for binding in &self.buttons {
            claim(binding.bit)?;
        }

        if used & EXTENSION_BITS_MASK != 0 {
            debug!(
                "Input mapping binds extension bits 0x{:04X}",
                used & EXTENSION_BITS_MASK
            );
        }

        Ok(())
    }

    /// The fixed keypad wiring.
    pub fn keypad() -> Self {
        Self {
            axes: KEYPAD_AXES.to_vec(),
            buttons: KEYPAD_BUTTONS.to_vec(),
        }
    }

    pub fn axes(&self) -> &[AxisBinding] {
        &self.axes
    }

    pub fn buttons(&self) -> &[ButtonBinding] {
        &self.buttons
    }

    /// Raw bits that drive some part of the report.
    pub fn wired_mask(&self) -> u16 {
        let axis_bits = self
            .axes
            .iter()
            .flat_map(|binding| [binding.negative_bit, binding.positive_bit]);
        let button_bits = self.buttons.iter().map(|binding| binding.bit);

        axis_bits
            .chain(button_bits)
            .fold(RawInputState::IDLE, RawInputState::with_bit)
            .bits()
    }

    /// Closed switches that this mapping ignores.
    pub fn unmapped_bits(&self, raw: RawInputState) -> u16 {
        raw.bits() & !self.wired_mask()
    }

    /// Build a complete report from one raw snapshot.
    pub fn encode(&self, raw: RawInputState) -> InputReport {
        encode_with(&self.axes, &self.buttons, raw)
    }
}

impl Default for InputMapping {
    fn default() -> Self {
        Self::keypad()
    }
}

/// Encode a raw keypad snapshot with the fixed keypad wiring.
pub fn encode(raw: RawInputState) -> InputReport {
    encode_with(&KEYPAD_AXES, &KEYPAD_BUTTONS, raw)
}

fn encode_with(axes: &[AxisBinding], buttons: &[ButtonBinding], raw: RawInputState) -> InputReport {
    let mut report = InputReport::neutral();

    for binding in axes {
        let value = binding.resolve(raw);
        match binding.axis {
            Axis::X => report.axis_x = value,
            Axis::Y => report.axis_y = value,
        }
    }

    report.buttons = buttons
        .iter()
        .filter(|binding| raw.is_set(binding.bit))
        .fold(Buttons::empty(), |acc, binding| acc | binding.button.flag());

    report
}
