//! Connection self-test.
//!
//! Mirrors the device bring-up checklist: handshake, wait for the first
//! frame, measure the telemetry rate over a short window, then send a junk
//! datagram and verify the device keeps streaming.
//!
//! Run with: `cargo run --example conntest -- [--address 192.168.4.1] [--port 4444]`

use clap::Parser;
use haptic_link::{ConnectionStatus, HapticSession, LinkConfig};
use std::net::{IpAddr, UdpSocket};
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(about = "Connection self-test for a haptic rotary device")]
struct Args {
    /// Device IP address.
    #[arg(long, default_value = "192.168.4.1")]
    address: IpAddr,

    /// Device UDP port.
    #[arg(long, default_value_t = 4444)]
    port: u16,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    let config = LinkConfig::new(args.address, args.port);

    println!("--- Haptic Connection Test ---");
    println!("Target: {}", config.device_addr());

    println!("\n[1] Sending handshake...");
    let session = HapticSession::connect(config.clone())?;
    if !wait_for_connect(&session, Duration::from_secs(2)) {
        eprintln!("No response. Is this machine on the device's network?");
        std::process::exit(1);
    }
    println!("Connection established.");

    println!("\n[2] Sampling for 3 seconds...");
    let window = Duration::from_secs(3);
    let frames = count_frames(&session, window);
    let rate = frames as f64 / window.as_secs_f64();
    println!("Result: {} frames in {:.2}s", frames, window.as_secs_f64());
    println!("Rate:   {:.2} Hz (target: ~20 Hz)", rate);
    if (15.0..=25.0).contains(&rate) {
        println!("RATE OK");
    } else {
        println!("RATE UNUSUAL (check interference or loop delay)");
    }

    println!("\n[3] Sending junk; the device should ignore it and stay alive...");
    let bind_addr = if config.address.is_ipv4() {
        "0.0.0.0:0"
    } else {
        "[::]:0"
    };
    let probe = UdpSocket::bind(bind_addr)?;
    probe.send_to(b"INVALID_JUNK_DATA", config.device_addr())?;

    let before = session.latest_sample().map(|s| s.received_at);
    std::thread::sleep(Duration::from_millis(500));
    if session.latest_sample().map(|s| s.received_at) != before {
        println!("Device is still streaming.");
    } else {
        println!("Device stopped streaming after junk!");
    }

    session.shutdown();
    println!("\n--- Test finished ---");
    Ok(())
}

fn wait_for_connect(session: &HapticSession, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if session.connection_status() == ConnectionStatus::Connected {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    false
}

/// Counts distinct frames by their arrival timestamp.
fn count_frames(session: &HapticSession, window: Duration) -> usize {
    let deadline = Instant::now() + window;
    let mut count = 0;
    let mut last = None;
    while Instant::now() < deadline {
        if let Some(sample) = session.latest_sample() {
            if last != Some(sample.received_at) {
                last = Some(sample.received_at);
                count += 1;
            }
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    count
}
