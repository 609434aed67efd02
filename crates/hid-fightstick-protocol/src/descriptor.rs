//! HID report descriptor for the fightstick interface
//!
//! The descriptor declares exactly the [`InputReport`](crate::InputReport)
//! wire layout: two 8-bit axes, a 4-bit hat with a null state plus 4 bits of
//! padding, then 16 one-bit buttons. The 8-byte output report lives on a
//! vendor page so hosts leave it alone.

pub const REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x05, // Usage (Game Pad)
    0xA1, 0x01, // Collection (Application)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x00, //   Logical Maximum (255)
    0x75, 0x08, //   Report Size (8)
    0x95, 0x02, //   Report Count (2)
    0x09, 0x30, //   Usage (X)
    0x09, 0x31, //   Usage (Y)
    0x81, 0x02, //   Input (Data,Var,Abs)
    0x25, 0x07, //   Logical Maximum (7)
    0x35, 0x00, //   Physical Minimum (0)
    0x46, 0x3B, 0x01, //   Physical Maximum (315)
    0x65, 0x14, //   Unit (Eng Rot: Degrees)
    0x75, 0x04, //   Report Size (4)
    0x95, 0x01, //   Report Count (1)
    0x09, 0x39, //   Usage (Hat switch)
    0x81, 0x42, //   Input (Data,Var,Abs,Null)
    0x65, 0x00, //   Unit (None)
    0x45, 0x00, //   Physical Maximum (0)
    0x81, 0x01, //   Input (Const) hat padding
    0x05, 0x09, //   Usage Page (Button)
    0x19, 0x01, //   Usage Minimum (Button 1)
    0x29, 0x10, //   Usage Maximum (Button 16)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x10, //   Report Count (16)
    0x81, 0x02, //   Input (Data,Var,Abs)
    0x06, 0x00, 0xFF, //   Usage Page (Vendor Defined 0xFF00)
    0x09, 0x20, //   Usage (0x20)
    0x26, 0xFF, 0x00, //   Logical Maximum (255)
    0x75, 0x08, //   Report Size (8)
    0x95, 0x08, //   Report Count (8)
    0x91, 0x02, //   Output (Data,Var,Abs)
    0xC0, // End Collection
];
