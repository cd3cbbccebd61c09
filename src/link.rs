//! UDP endpoint ownership.
//!
//! The endpoint wraps the local UDP socket and the device's address. The
//! receive loop and the command dispatcher hold clones of the same
//! endpoint: `UdpSocket`'s send and receive paths are independent, so
//! command sends never contend with or block reception.

use log::debug;
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::sync::Arc;

use crate::error::ConnectError;
use crate::protocol::{self, HANDSHAKE};
use crate::types::{Command, LinkConfig};

/// The local UDP socket plus the device's address.
///
/// Created once at link construction and shared between the receive loop
/// and the session handle; released when the last clone is dropped.
#[derive(Clone)]
pub(crate) struct Endpoint {
    socket: Arc<UdpSocket>,
    device_addr: SocketAddr,
}

impl Endpoint {
    /// Creates and configures the local socket.
    ///
    /// The read timeout is the config's poll interval, which bounds every
    /// receive attempt made by the receive loop. This is the only place a
    /// hard failure can originate after argument validation.
    pub fn open(config: &LinkConfig) -> Result<Self, ConnectError> {
        let device_addr = config.device_addr();

        let domain = Domain::for_address(device_addr);
        let socket =
            Socket::new(domain, Type::DGRAM, Some(Protocol::UDP)).map_err(ConnectError::Bind)?;

        let bind_addr: SocketAddr = if device_addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        socket
            .bind(&SockAddr::from(bind_addr))
            .map_err(ConnectError::Bind)?;
        socket
            .set_read_timeout(Some(config.poll_interval))
            .map_err(ConnectError::Configure)?;

        let socket: UdpSocket = socket.into();
        let local_addr = socket.local_addr().map_err(ConnectError::Configure)?;
        debug!("socket bound to {} for device {}", local_addr, device_addr);

        Ok(Self {
            socket: Arc::new(socket),
            device_addr,
        })
    }

    pub fn device_addr(&self) -> SocketAddr {
        self.device_addr
    }

    /// Sends the handshake/probe token to the device.
    pub fn send_handshake(&self) -> io::Result<()> {
        self.socket.send_to(HANDSHAKE, self.device_addr)?;
        debug!("handshake sent to {}", self.device_addr);
        Ok(())
    }

    /// Encodes and sends a command to the device. Fire-and-forget.
    pub fn send_command(&self, command: &Command) -> io::Result<()> {
        let payload = protocol::encode_command(command);
        self.socket.send_to(&payload, self.device_addr)?;
        debug!(
            "command sent to {}: {}",
            self.device_addr,
            String::from_utf8_lossy(&payload)
        );
        Ok(())
    }

    /// Receives a single datagram, waiting at most the configured poll
    /// interval. The sender's address is not interpreted; the device is
    /// the only expected peer.
    pub fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        let (len, _addr) = self.socket.recv_from(buf)?;
        Ok(len)
    }
}
