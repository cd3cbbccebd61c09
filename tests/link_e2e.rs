//! End-to-end tests against a mock device.
//!
//! These drive the full lifecycle — handshake, telemetry, garbage
//! filtering, silence recovery, commands, shutdown — over real UDP sockets
//! on the loopback interface. The mock device is driven inline by each
//! test, which keeps the ordering of wire events deterministic.

use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::thread;
use std::time::{Duration, Instant};

use haptic_link::{ConnectionStatus, HapticSession, LinkConfig, SendError};

const STALE_AFTER: Duration = Duration::from_millis(200);
const POLL_INTERVAL: Duration = Duration::from_millis(25);

// =============================================================================
// Mock Device
// =============================================================================

/// A scripted stand-in for the device: one UDP socket on loopback.
struct MockDevice {
    socket: UdpSocket,
    buf: [u8; 256],
}

impl MockDevice {
    fn bind() -> Self {
        let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).expect("bind mock device");
        socket
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        Self {
            socket,
            buf: [0u8; 256],
        }
    }

    /// A link configuration pointing at this mock, with test-friendly
    /// timing.
    fn config(&self) -> LinkConfig {
        let addr = self.socket.local_addr().unwrap();
        LinkConfig::new(addr.ip(), addr.port())
            .with_stale_after(STALE_AFTER)
            .with_poll_interval(POLL_INTERVAL)
    }

    /// Waits for the next datagram from the client.
    fn recv(&mut self) -> (Vec<u8>, SocketAddr) {
        let (len, peer) = self
            .socket
            .recv_from(&mut self.buf)
            .expect("mock device recv");
        (self.buf[..len].to_vec(), peer)
    }

    /// Waits for the next datagram that is not a handshake probe.
    fn recv_command(&mut self) -> Vec<u8> {
        loop {
            let (payload, _peer) = self.recv();
            if payload != b"HELLO" {
                return payload;
            }
        }
    }

    fn send(&self, peer: SocketAddr, payload: &[u8]) {
        self.socket
            .send_to(payload, peer)
            .expect("mock device send");
    }
}

fn wait_for(what: &str, condition: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return;
        }
        thread::sleep(Duration::from_millis(5));
    }
    panic!("timed out waiting for {}", what);
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn test_handshake_then_telemetry_connects() {
    let mut device = MockDevice::bind();
    let session = HapticSession::connect(device.config()).unwrap();
    assert_eq!(session.connection_status(), ConnectionStatus::Handshaking);
    assert!(session.latest_sample().is_none());

    let (payload, peer) = device.recv();
    assert_eq!(payload, b"HELLO");

    device.send(peer, b"1.5708,2.0\n");
    wait_for("link to connect", || {
        session.connection_status().is_connected()
    });

    let sample = session.latest_sample().unwrap();
    assert!((sample.angle - 1.5708).abs() < 1e-9);
    assert!((sample.velocity - 2.0).abs() < 1e-9);
}

#[test]
fn test_garbage_leaves_snapshot_untouched() {
    let mut device = MockDevice::bind();
    // A long staleness window so this test only exercises the codec filter.
    let config = device.config().with_stale_after(Duration::from_secs(10));
    let session = HapticSession::connect(config).unwrap();

    let (_hello, peer) = device.recv();
    device.send(peer, b"0.25,-1.5");
    wait_for("link to connect", || {
        session.connection_status().is_connected()
    });
    let before = session.latest_sample().unwrap();

    let junk: &[&[u8]] = &[
        b"INVALID_JUNK_DATA",
        b"",
        b"no separator here",
        b"x,y",
        b"nan,1.0",
    ];
    for payload in junk {
        device.send(peer, payload);
    }
    thread::sleep(POLL_INTERVAL * 4);

    assert_eq!(session.connection_status(), ConnectionStatus::Connected);
    assert_eq!(session.latest_sample().unwrap(), before);
}

#[test]
fn test_silence_triggers_reprobe_and_recovery() {
    let mut device = MockDevice::bind();
    let session = HapticSession::connect(device.config()).unwrap();

    let (_hello, peer) = device.recv();
    device.send(peer, b"0.1,0.2");
    wait_for("link to connect", || {
        session.connection_status().is_connected()
    });

    // Go silent. The client must notice and re-announce itself.
    let (payload, _peer) = device.recv();
    assert_eq!(payload, b"HELLO");
    wait_for("status to leave connected", || {
        !session.connection_status().is_connected()
    });

    // Resumed telemetry recovers the link with fresh values.
    device.send(peer, b"0.3,0.4");
    wait_for("link to recover", || {
        session.connection_status().is_connected()
    });
    let sample = session.latest_sample().unwrap();
    assert!((sample.angle - 0.3).abs() < 1e-9);
    assert!((sample.velocity - 0.4).abs() < 1e-9);
}

#[test]
fn test_command_bytes_on_wire() {
    let mut device = MockDevice::bind();
    let session = HapticSession::connect(device.config()).unwrap();
    let (_hello, _peer) = device.recv();

    session.set_stepping_mode(true).unwrap();
    assert_eq!(device.recv_command(), b"STEPS:1");

    session.set_stepping_mode(false).unwrap();
    assert_eq!(device.recv_command(), b"STEPS:0");

    // Repeating a command produces the identical payload.
    session.set_stepping_mode(false).unwrap();
    assert_eq!(device.recv_command(), b"STEPS:0");
}

#[test]
fn test_shutdown_is_idempotent_and_blocks_sends() {
    let mut device = MockDevice::bind();
    let session = HapticSession::connect(device.config()).unwrap();

    let (_hello, peer) = device.recv();
    device.send(peer, b"1.0,1.0");
    wait_for("link to connect", || {
        session.connection_status().is_connected()
    });

    session.shutdown();
    assert_eq!(session.connection_status(), ConnectionStatus::Disconnected);

    match session.set_stepping_mode(true) {
        Err(SendError::SocketUnavailable) => {}
        other => panic!("expected SocketUnavailable, got {:?}", other),
    }

    // Frames arriving after shutdown no longer mutate the snapshot.
    let before = session.latest_sample().unwrap();
    device.send(peer, b"9.0,9.0");
    thread::sleep(POLL_INTERVAL * 4);
    assert_eq!(session.latest_sample().unwrap(), before);
    assert_eq!(session.connection_status(), ConnectionStatus::Disconnected);

    // Second shutdown is a no-op.
    session.shutdown();
}
