//! Button flags carried in the input report

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Button bitmask of the input report (bytes 3–4, little-endian).
    ///
    /// The layout follows the Switch Pro pad ordering so hosts that already
    /// know it need no remapping. Bits 14 and 15 are reserved.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Buttons: u16 {
        const Y       = 0x0001;
        const B       = 0x0002;
        const A       = 0x0004;
        const X       = 0x0008;
        const L       = 0x0010;
        const R       = 0x0020;
        const ZL      = 0x0040;
        const ZR      = 0x0080;
        const MINUS   = 0x0100;
        /// Start
        const PLUS    = 0x0200;
        const LCLICK  = 0x0400;
        const RCLICK  = 0x0800;
        const HOME    = 0x1000;
        const CAPTURE = 0x2000;

        const RESERVED = 0xC000;
    }
}

/// A single semantic button, as named in mapping tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchButton {
    Y,
    B,
    A,
    X,
    L,
    R,
    Zl,
    Zr,
    Minus,
    Plus,
    LeftClick,
    RightClick,
    Home,
    Capture,
}

impl SwitchButton {
    pub const ALL: [SwitchButton; 14] = [
        SwitchButton::Y,
        SwitchButton::B,
        SwitchButton::A,
        SwitchButton::X,
        SwitchButton::L,
        SwitchButton::R,
        SwitchButton::Zl,
        SwitchButton::Zr,
        SwitchButton::Minus,
        SwitchButton::Plus,
        SwitchButton::LeftClick,
        SwitchButton::RightClick,
        SwitchButton::Home,
        SwitchButton::Capture,
    ];

    pub const fn flag(self) -> Buttons {
        match self {
            SwitchButton::Y => Buttons::Y,
            SwitchButton::B => Buttons::B,
            SwitchButton::A => Buttons::A,
            SwitchButton::X => Buttons::X,
            SwitchButton::L => Buttons::L,
            SwitchButton::R => Buttons::R,
            SwitchButton::Zl => Buttons::ZL,
            SwitchButton::Zr => Buttons::ZR,
            SwitchButton::Minus => Buttons::MINUS,
            SwitchButton::Plus => Buttons::PLUS,
            SwitchButton::LeftClick => Buttons::LCLICK,
            SwitchButton::RightClick => Buttons::RCLICK,
            SwitchButton::Home => Buttons::HOME,
            SwitchButton::Capture => Buttons::CAPTURE,
        }
    }
}

impl From<SwitchButton> for Buttons {
    fn from(button: SwitchButton) -> Self {
        button.flag()
    }
}

static_assertions::const_assert_eq!(std::mem::size_of::<Buttons>(), 2);
