//! Fightstick device: owns the transport, the sampler and the output sink

use crate::{
    DeviceConfig, DeviceError, DeviceResult, DiscardOutput, EndpointAddress, ExchangeStats,
    InputSampler, OutputSink, UsbTransport,
};
use hid_fightstick_protocol::InputReport;
use tracing::{debug, info, warn};

/// Keypad fightstick exposed to the host as a HID gamepad.
///
/// All work happens from [`tick`](Self::tick), which the firmware main loop
/// calls forever, and from the event callbacks the USB stack dispatches on
/// the same loop.
pub struct FightstickDevice<T, S, O = DiscardOutput> {
    pub(crate) transport: T,
    pub(crate) sampler: S,
    pub(crate) sink: O,
    pub(crate) config: DeviceConfig,
    pub(crate) stats: ExchangeStats,
}

impl<T, S> FightstickDevice<T, S, DiscardOutput>
where
    T: UsbTransport,
    S: InputSampler,
{
    /// Device with the default identity, endpoints and keypad mapping.
    pub fn new(transport: T, sampler: S) -> Self {
        Self {
            transport,
            sampler,
            sink: DiscardOutput,
            config: DeviceConfig::default(),
            stats: ExchangeStats::default(),
        }
    }

    pub fn with_config(transport: T, sampler: S, config: DeviceConfig) -> DeviceResult<Self> {
        config.validate()?;
        debug!(
            "Fightstick configured: VID=0x{:04X}, PID=0x{:04X}, IN={}, OUT={}",
            config.vendor_id, config.product_id, config.in_endpoint, config.out_endpoint
        );

        Ok(Self {
            transport,
            sampler,
            sink: DiscardOutput,
            config,
            stats: ExchangeStats::default(),
        })
    }
}

impl<T, S, O> FightstickDevice<T, S, O>
where
    T: UsbTransport,
    S: InputSampler,
    O: OutputSink,
{
    /// Replace the output sink.
    pub fn with_sink<P: OutputSink>(self, sink: P) -> FightstickDevice<T, S, P> {
        FightstickDevice {
            transport: self.transport,
            sampler: self.sampler,
            sink,
            config: self.config,
            stats: self.stats,
        }
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn stats(&self) -> &ExchangeStats {
        &self.stats
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn sampler_mut(&mut self) -> &mut S {
        &mut self.sampler
    }

    pub fn sink(&self) -> &O {
        &self.sink
    }

    pub fn into_parts(self) -> (T, S, O) {
        (self.transport, self.sampler, self.sink)
    }

    /// Sample the keypad once and encode a complete report from that sample.
    pub fn current_report(&mut self) -> InputReport {
        let raw = self.sampler.sample();
        self.config.mapping.encode(raw)
    }

    pub fn on_connect(&mut self) {
        info!(
            "Fightstick attached to host (VID=0x{:04X}, PID=0x{:04X})",
            self.config.vendor_id, self.config.product_id
        );
    }

    pub fn on_disconnect(&mut self) {
        info!("Fightstick detached from host");
    }

    /// Provision the OUT endpoint, then the IN endpoint.
    ///
    /// Both are attempted even when the first one is rejected.
    pub fn on_configuration_changed(&mut self) -> DeviceResult<()> {
        let endpoints = [
            self.config.out_endpoint_config(),
            self.config.in_endpoint_config(),
        ];

        let mut failed: Vec<EndpointAddress> = Vec::new();
        for endpoint in endpoints {
            if !self.transport.configure_endpoint(endpoint) {
                failed.push(endpoint.address);
            }
        }

        if failed.is_empty() {
            info!(
                "Interrupt endpoints ready: OUT={} ({} bytes), IN={} ({} bytes), interval {} ms",
                self.config.out_endpoint,
                self.config.out_endpoint_size,
                self.config.in_endpoint,
                self.config.in_endpoint_size,
                self.config.poll_interval_ms
            );
            Ok(())
        } else {
            warn!("Endpoint provisioning failed for {:?}", failed);
            Err(DeviceError::EndpointProvisioning { failed })
        }
    }

    /// One iteration of the main loop: endpoint exchange, then stack housekeeping.
    pub fn tick(&mut self) {
        self.poll();
        self.transport.usb_task();
    }

    pub fn run(&mut self) -> ! {
        loop {
            self.tick();
        }
    }
}
