//! Snapshot tests for the fightstick transport traffic.
//!
//! These lock in the exact sequence of stack primitives per operation so an
//! ordering regression in the exchange loop or control handler breaks loudly.

use fightstick_device::{
    DeviceConfig, FightstickDevice, FixedInput, SetupPacket,
    mock::{MockTransport, TransportCall},
};
use insta::assert_snapshot;

fn trace(calls: &[TransportCall]) -> String {
    calls
        .iter()
        .map(|call| match call {
            TransportCall::SelectEndpoint(address) => format!("select {address}"),
            TransportCall::ConfigureEndpoint(config) => format!(
                "configure {} {:?} {}B {}ms",
                config.address, config.kind, config.size, config.interval_ms
            ),
            TransportCall::WriteStream(data) => format!("write {data:02X?}"),
            TransportCall::WriteControlStream(data) => format!("control-write {data:02X?}"),
            other => format!("{other:?}"),
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

#[test]
fn test_snapshot_idle_poll() {
    let mut device = FightstickDevice::new(MockTransport::configured(), FixedInput::new(0));
    device.poll();
    assert_snapshot!(
        trace(device.transport().calls()),
        @"select 0x02 | IsOutReceived | select 0x81 | IsInReady | write [80, 80, 08, 00, 00] | ClearIn"
    );
}

#[test]
fn test_snapshot_poll_with_out_packet() {
    let mut device = FightstickDevice::new(MockTransport::configured(), FixedInput::new(0x0201));
    device.transport_mut().queue_out_packet(vec![0; 8]);
    device.poll();
    assert_snapshot!(
        trace(device.transport().calls()),
        @"select 0x02 | IsOutReceived | IsReadWriteAllowed | ReadStream(8) | ClearOut | select 0x81 | IsInReady | write [80, 80, 08, 14, 00] | ClearIn"
    );
}

#[test]
fn test_snapshot_host_busy() {
    let mut transport = MockTransport::configured();
    transport.set_in_ready(false);
    let mut device = FightstickDevice::new(transport, FixedInput::new(0xFFFF));
    device.tick();
    assert_snapshot!(
        trace(device.transport().calls()),
        @"select 0x02 | IsOutReceived | select 0x81 | IsInReady | UsbTask"
    );
}

#[test]
fn test_snapshot_get_report() {
    let mut device = FightstickDevice::new(MockTransport::configured(), FixedInput::new(0x0004));
    device.handle_control_request(&SetupPacket::get_input_report(0));
    assert_snapshot!(
        trace(device.transport().calls()),
        @"ClearSetup | control-write [00, 80, 08, 00, 00] | ClearOut"
    );
}

#[test]
fn test_snapshot_set_report() {
    let mut device = FightstickDevice::new(MockTransport::configured(), FixedInput::default());
    device.handle_control_request(&SetupPacket::set_output_report(0));
    assert_snapshot!(
        trace(device.transport().calls()),
        @"ClearSetup | ReadControlStream(8) | ClearIn"
    );
}

#[test]
fn test_snapshot_configuration_changed() {
    let mut device = FightstickDevice::new(MockTransport::configured(), FixedInput::default());
    let result = device.on_configuration_changed();
    assert_eq!(result, Ok(()));
    assert_snapshot!(
        trace(device.transport().calls()),
        @"configure 0x02 Interrupt 8B 1ms | configure 0x81 Interrupt 5B 1ms"
    );
}

#[test]
fn test_snapshot_default_config_json() -> Result<(), serde_json::Error> {
    let config = DeviceConfig::default();
    let json = serde_json::to_value(&config)?;
    let summary = format!(
        "vid={} pid={} in={} out={} interval={} sizes={}/{}",
        json["vendor_id"],
        json["product_id"],
        json["in_endpoint"],
        json["out_endpoint"],
        json["poll_interval_ms"],
        json["in_endpoint_size"],
        json["out_endpoint_size"]
    );
    assert_snapshot!(summary, @"vid=4617 pid=1 in=129 out=2 interval=1 sizes=5/8");
    Ok(())
}
