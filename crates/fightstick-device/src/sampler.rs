//! Raw keypad sampling

use hid_fightstick_protocol::RawInputState;

/// Source of the instantaneous keypad state.
///
/// Sampling has no failure mode and must finish well inside one poll tick.
pub trait InputSampler {
    fn sample(&mut self) -> RawInputState;
}

impl<F> InputSampler for F
where
    F: FnMut() -> RawInputState,
{
    fn sample(&mut self) -> RawInputState {
        self()
    }
}

/// Sampler returning a settable constant state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedInput(pub RawInputState);

impl FixedInput {
    pub fn new(bits: u16) -> Self {
        Self(RawInputState::new(bits))
    }

    pub fn set(&mut self, state: RawInputState) {
        self.0 = state;
    }
}

impl InputSampler for FixedInput {
    fn sample(&mut self) -> RawInputState {
        self.0
    }
}

/// Serial link to the two daisy-chained parallel-in shift registers.
pub trait ShiftRegisterBus {
    /// Drive the shift/load line. High freezes the parallel inputs for shifting.
    fn set_latch(&mut self, high: bool);

    /// Clock eight bits out of the register chain.
    fn receive_byte(&mut self) -> u8;
}

/// Keypad read through a pair of shift registers, low byte first.
#[derive(Debug, Clone)]
pub struct ShiftRegisterKeypad<B> {
    bus: B,
}

impl<B: ShiftRegisterBus> ShiftRegisterKeypad<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn into_inner(self) -> B {
        self.bus
    }
}

impl<B: ShiftRegisterBus> InputSampler for ShiftRegisterKeypad<B> {
    fn sample(&mut self) -> RawInputState {
        self.bus.set_latch(true);
        let lo = self.bus.receive_byte();
        let hi = self.bus.receive_byte();
        self.bus.set_latch(false);

        RawInputState::new(u16::from_le_bytes([lo, hi]))
    }
}
