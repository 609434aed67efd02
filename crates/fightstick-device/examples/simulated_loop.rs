//! Simulated Fightstick Loop
//!
//! Drives the fightstick through enumeration and a few hundred main-loop
//! ticks against the recording mock transport, with a scripted keypad that
//! walks the stick around and mashes a button.

use fightstick_device::{
    DeviceState, FightstickDevice, SetupPacket,
    mock::{MockTransport, TransportCall},
};
use hid_fightstick_protocol::RawInputState;

const LEFT: u16 = 1 << 2;
const RIGHT: u16 = 1 << 10;
const UP: u16 = 1 << 7;
const A: u16 = 1 << 9;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("Fightstick simulated main loop");
    println!("==============================\n");

    let mut frame = 0u32;
    let keypad = move || {
        frame = frame.wrapping_add(1);
        let stick = match (frame / 50) % 4 {
            0 => LEFT,
            1 => UP,
            2 => RIGHT,
            _ => LEFT | RIGHT,
        };
        let button = if frame % 10 < 5 { A } else { 0 };
        RawInputState::new(stick | button)
    };

    let mut device = FightstickDevice::new(MockTransport::new(), keypad);

    // Ticks before enumeration do nothing on the endpoints.
    device.tick();
    device.on_connect();
    device.transport_mut().set_state(DeviceState::Configured);
    device.on_configuration_changed()?;

    for tick in 0..200u32 {
        if tick % 40 == 0 {
            device.transport_mut().queue_out_packet(vec![0u8; 8]);
        }
        // Host busy every seventh frame.
        device.transport_mut().set_in_ready(tick % 7 != 0);
        device.tick();
    }

    device.handle_control_request(&SetupPacket::get_input_report(0));
    device.handle_control_request(&SetupPacket::set_output_report(0));
    device.on_disconnect();

    let stats = *device.stats();
    let transport = device.transport();
    println!("\nStatistics");
    println!("  polls:            {}", stats.polls);
    println!("  skipped (state):  {}", stats.unconfigured_skips);
    println!("  reports sent:     {}", stats.reports_sent);
    println!("  host busy:        {}", stats.in_not_ready);
    println!("  OUT acknowledged: {}", stats.out_packets_acknowledged);
    println!("  control handled:  {}", stats.control_requests_handled);
    println!(
        "  usb tasks:        {}",
        transport.count(&TransportCall::UsbTask)
    );

    if let Some(last) = transport.written_reports().last() {
        println!("  last report:      {last:02X?}");
    }

    Ok(())
}
