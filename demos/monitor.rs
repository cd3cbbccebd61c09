//! Console telemetry monitor.
//!
//! Prints a live line of angle/velocity and lets the link recover on its
//! own when the device goes quiet.
//!
//! Run with: `cargo run --example monitor -- [--address 192.168.4.1] [--port 4444]`

use clap::Parser;
use haptic_link::{HapticSession, LinkConfig};
use std::io::Write;
use std::net::IpAddr;
use std::time::Duration;

#[derive(Parser)]
#[command(about = "Live console monitor for a haptic rotary device")]
struct Args {
    /// Device IP address.
    #[arg(long, default_value = "192.168.4.1")]
    address: IpAddr,

    /// Device UDP port.
    #[arg(long, default_value_t = 4444)]
    port: u16,

    /// Set the stepping mode once after connecting.
    #[arg(long)]
    stepping: Option<bool>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let config = LinkConfig::new(args.address, args.port);
    println!("Target: {}", config.device_addr());

    let session = HapticSession::connect(config)?;

    if let Some(enabled) = args.stepping {
        session.set_stepping_mode(enabled)?;
        println!("Stepping mode {}", if enabled { "enabled" } else { "disabled" });
    }

    println!("Waiting for telemetry... Press Ctrl+C to quit\n");
    loop {
        match session.latest_sample() {
            Some(sample) => print!(
                "\rangle: {:7.3} rad | velocity: {:7.3} rad/s | {}   ",
                sample.angle,
                sample.velocity,
                session.connection_status()
            ),
            None => print!("\rwaiting... ({})   ", session.connection_status()),
        }
        std::io::stdout().flush()?;
        std::thread::sleep(Duration::from_millis(50));
    }
}
