//! UDP transport: the [`PacketSink`] implementation the session sends
//! through, plus the receive side that decodes inbound datagrams.
//!
//! Architecture:
//! - [`UdpTransport`] owns a connected `tokio::net::UdpSocket` behind an
//!   `Arc`, so it is cheap to clone.  One clone goes into the `Session` as
//!   its sink; another stays with the main loop for receiving.
//! - Inbound datagrams are decoded with the core codec and handed back as
//!   [`Packet`]s; the caller decides what to do with them (typically
//!   `Session::observe`).
//!
//! The protocol offers no reliability on top of UDP – the fivefold
//! redundant send in `cw-core` is the whole loss story – so this module is
//! deliberately thin: resolve, bind, connect, send, receive.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use cw_core::protocol::packets::SIZE_DATA_PACKET;
use cw_core::{decode_packet, Packet, PacketSink, WireError};
use thiserror::Error;
use tokio::net::UdpSocket;
use tracing::debug;

/// Errors that can occur in the client network layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server name resolved to no usable address.
    #[error("server address {server} did not resolve")]
    NoAddress { server: String },

    /// Socket setup (resolve, bind, or connect) failed.
    #[error("failed to connect to server at {server}: {source}")]
    ConnectFailed {
        server: String,
        #[source]
        source: std::io::Error,
    },

    /// An I/O error occurred on the established socket.
    #[error("socket I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An inbound datagram was not a recognisable packet.
    #[error("undecodable datagram: {0}")]
    Wire(#[from] WireError),
}

/// A connected UDP socket to the relay server.
///
/// Cloning shares the underlying socket; UDP sends and receives need no
/// coordination beyond what the kernel provides.
#[derive(Debug, Clone)]
pub struct UdpTransport {
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
}

impl UdpTransport {
    /// Resolves `server` (`host:port`), binds an ephemeral local socket of
    /// the matching address family, and connects it.
    ///
    /// # Errors
    ///
    /// [`TransportError::NoAddress`] if resolution yields nothing,
    /// [`TransportError::ConnectFailed`] for resolve/bind/connect failures.
    pub async fn connect(server: &str) -> Result<Self, TransportError> {
        let wrap = |source: std::io::Error| TransportError::ConnectFailed {
            server: server.to_string(),
            source,
        };

        let peer = tokio::net::lookup_host(server)
            .await
            .map_err(wrap)?
            .next()
            .ok_or_else(|| TransportError::NoAddress {
                server: server.to_string(),
            })?;

        let bind_addr = if peer.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(bind_addr).await.map_err(wrap)?;
        socket.connect(peer).await.map_err(wrap)?;

        debug!(%peer, "UDP transport connected");
        Ok(Self {
            socket: Arc::new(socket),
            peer,
        })
    }

    /// The server address this transport is connected to.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Receives one datagram and decodes it.
    ///
    /// # Errors
    ///
    /// [`TransportError::Io`] on socket failure, [`TransportError::Wire`]
    /// when the datagram is not a recognisable packet (the caller should
    /// log and move on – the channel carries other implementations' quirks).
    pub async fn recv_packet(&self) -> Result<Packet, TransportError> {
        // A data packet is the largest thing the protocol defines; anything
        // longer is foreign traffic and will fail to decode anyway.
        let mut buf = [0u8; SIZE_DATA_PACKET];
        let len = self.socket.recv(&mut buf).await?;
        Ok(decode_packet(&buf[..len])?)
    }
}

#[async_trait]
impl PacketSink for UdpTransport {
    async fn send_packet(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let sent = self.socket.send(bytes).await?;
        if sent != bytes.len() {
            // A UDP send is all-or-nothing on every sane stack; a short send
            // means the packet did not go out as framed.
            return Err(std::io::Error::other("short datagram send"));
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
