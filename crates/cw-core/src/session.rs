//! Session state and the client protocol engine.
//!
//! A [`Session`] is the single record a connected client needs: the send
//! handle, the channel it joined, the prepared packet prototypes, and the
//! two sequence counters.  The engine operations – [`identify`],
//! [`send_latch`], [`send_unlatch`], and [`disconnect`] – mutate this record
//! and emit packets through the [`PacketSink`].
//!
//! # The fivefold send (for beginners)
//!
//! Keying events travel over bare UDP, and a lost key-up means a stuck
//! sounder on every listening client.  Instead of acknowledgements and
//! retransmission, the protocol simply sends each keying packet **five
//! times in a row**, all five carrying the same sequence number, and makes
//! every receiver deduplicate.  This is redundancy, not retry: the copies
//! are emitted unconditionally, back to back, whether or not an earlier
//! copy's send failed.
//!
//! # Who drives the session?
//!
//! Nobody inside this crate.  The session is a passive state machine: a
//! keyer or UI calls the keying operations, and whoever reads the socket
//! hands decoded inbound packets to [`observe`].  All operations run to
//! completion and suspend only on the sink, so a single task owning the
//! session never races itself.  The session is deliberately `&mut self`
//! throughout – concurrent callers must serialise externally.
//!
//! [`identify`]: Session::identify
//! [`send_latch`]: Session::send_latch
//! [`send_unlatch`]: Session::send_unlatch
//! [`disconnect`]: Session::disconnect
//! [`observe`]: Session::observe

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::protocol::codec::{encode_command, encode_data, Packet};
use crate::protocol::packets::{CommandCode, DataPacket, SIZE_COMMAND_PACKET};
use crate::protocol::sequence::SequenceCounter;

/// Number of copies of each keying packet put on the wire.
pub const REDUNDANT_SENDS: usize = 5;

// ── Transport seam ────────────────────────────────────────────────────────────

/// A pre-connected, message-oriented send handle.
///
/// One call sends one datagram.  The implementation may apply backpressure
/// by suspending; it must not fragment or coalesce packets.  Socket setup
/// and teardown live with the caller – the session never closes the sink.
#[async_trait]
pub trait PacketSink {
    /// Sends one packet to the server.
    async fn send_packet(&mut self, bytes: &[u8]) -> std::io::Result<()>;
}

/// In-memory sink: records every packet instead of sending it.
///
/// This is the test seam.  A `Vec<Vec<u8>>` session captures the exact
/// bytes the engine emits, in order, so tests can assert on the wire
/// contract without a socket.
#[async_trait]
impl PacketSink for Vec<Vec<u8>> {
    async fn send_packet(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.push(bytes.to_vec());
        Ok(())
    }
}

// ── Errors and states ─────────────────────────────────────────────────────────

/// Errors surfaced by the engine operations.
///
/// The engine recovers nothing locally; every error reaches the caller, and
/// after a transport failure the session is effectively dead – tear it down
/// and reconnect at a higher layer.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The underlying send handle failed.  Surfaced unchanged, no retry.
    #[error("transport send failed: {0}")]
    Transport(#[from] std::io::Error),

    /// The operation is not allowed in the session's current state.
    #[error("{operation} is not allowed in the {state:?} state")]
    WrongState {
        operation: &'static str,
        state: SessionState,
    },
}

/// Lifecycle states of the protocol engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Joined nothing yet; only [`Session::identify`] is useful here.
    Unidentified,
    /// Present on the channel; keying operations are allowed.
    Identified,
    /// [`Session::disconnect`] was called.  Terminal.
    Closed,
}

// ── Session ───────────────────────────────────────────────────────────────────

/// Process state for one relay connection.
///
/// Construction (`new`) performs the `prepare_session` step: it builds the
/// connect/disconnect command packets and the id/transmit prototypes once.
/// The prototypes are then patched in place before each send, so steady-state
/// keying allocates nothing.
///
/// Exactly one session per connection; the design supports a single session
/// per process, owned by whoever drives the keyer.
#[derive(Debug)]
pub struct Session<S> {
    sink: S,
    channel: u16,
    client_id: String,
    connect_packet: [u8; SIZE_COMMAND_PACKET],
    disconnect_packet: [u8; SIZE_COMMAND_PACKET],
    id_packet: DataPacket,
    tx_template: DataPacket,
    tx_sequence: SequenceCounter,
    rx_sequence: u32,
    state: SessionState,
}

impl<S> Session<S> {
    /// Prepares a session on `channel` identifying as `client_id`.
    ///
    /// `sink` must already be connected to the server.  Nothing is sent
    /// until [`identify`](Self::identify).
    pub fn new(sink: S, channel: u16, client_id: &str) -> Self {
        let connect_packet = encode_command(CommandCode::Connect, channel)
            .expect("CON heads the command layout");
        let disconnect_packet =
            encode_command(CommandCode::Disconnect, 0).expect("DIS heads the command layout");

        Self {
            sink,
            channel,
            client_id: client_id.to_owned(),
            connect_packet,
            disconnect_packet,
            id_packet: DataPacket::id_packet(client_id),
            tx_template: DataPacket::tx_template(client_id),
            tx_sequence: SequenceCounter::new(),
            rx_sequence: 0,
            state: SessionState::Unidentified,
        }
    }

    /// The channel this session joins.
    pub fn channel(&self) -> u16 {
        self.channel
    }

    /// The client identifier sent in every data packet.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Current engine state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Sequence number of the most recently emitted data packet.
    pub fn tx_sequence(&self) -> u32 {
        self.tx_sequence.current()
    }

    /// Sequence number of the most recently observed inbound data packet.
    pub fn rx_sequence(&self) -> u32 {
        self.rx_sequence
    }

    /// Borrows the send handle.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consumes the session and returns the send handle, so the caller can
    /// close it.  The session never closes the handle itself.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Records an inbound packet.
    ///
    /// Only data packets advance `rx_sequence`; command packets carry no
    /// sequence, and ACKs are informational traffic this client ignores
    /// entirely.
    pub fn observe(&mut self, packet: &Packet) {
        if let Packet::Data(data) = packet {
            self.rx_sequence = data.sequence;
            debug!(
                rx_sequence = data.sequence,
                from = %data.id_str(),
                "observed inbound data packet"
            );
        }
    }
}

impl<S: PacketSink> Session<S> {
    /// Joins the channel and announces the client id.
    ///
    /// Emits the 4-byte CON packet followed by the 496-byte id packet, the
    /// latter stamped with a freshly bumped sequence number.  Allowed from
    /// `Unidentified` and again from `Identified` – relay servers drop
    /// silent clients, and re-sending the id packet is how a client stays
    /// present on the channel.
    ///
    /// # Errors
    ///
    /// [`SessionError::WrongState`] after [`disconnect`](Self::disconnect);
    /// [`SessionError::Transport`] if either send fails.
    pub async fn identify(&mut self) -> Result<(), SessionError> {
        if self.state == SessionState::Closed {
            return Err(SessionError::WrongState {
                operation: "identify",
                state: self.state,
            });
        }

        self.id_packet.sequence = self.tx_sequence.bump();
        self.sink.send_packet(&self.connect_packet).await?;
        self.sink.send_packet(&encode_data(&self.id_packet)).await?;
        self.state = SessionState::Identified;
        debug!(
            channel = self.channel,
            id = %self.client_id,
            sequence = self.id_packet.sequence,
            "identified on channel"
        );
        Ok(())
    }

    /// Sends a key-down event.
    ///
    /// # Errors
    ///
    /// See [`send_unlatch`](Self::send_unlatch); the two differ only in the
    /// code element.
    pub async fn send_latch(&mut self) -> Result<(), SessionError> {
        self.send_keying("send_latch", 1).await
    }

    /// Sends a key-up event.
    ///
    /// # Errors
    ///
    /// [`SessionError::WrongState`] unless the session is `Identified`;
    /// [`SessionError::Transport`] if any of the five copies failed (the
    /// remaining copies are still attempted, and the first failure wins).
    pub async fn send_unlatch(&mut self) -> Result<(), SessionError> {
        self.send_keying("send_unlatch", 2).await
    }

    /// Shared body of the two keying operations: `element` is the second
    /// code entry, +1 for latch and +2 for unlatch.
    async fn send_keying(&mut self, operation: &'static str, element: i32) -> Result<(), SessionError> {
        if self.state != SessionState::Identified {
            return Err(SessionError::WrongState {
                operation,
                state: self.state,
            });
        }

        self.tx_template.sequence = self.tx_sequence.bump();
        self.tx_template.code[0] = -1;
        self.tx_template.code[1] = element;
        self.tx_template.n = 2;

        // One encode, five sends: every copy of this event must be
        // byte-identical, sequence number included.
        let bytes = encode_data(&self.tx_template);
        let mut first_error: Option<std::io::Error> = None;
        for copy in 0..REDUNDANT_SENDS {
            if let Err(e) = self.sink.send_packet(&bytes).await {
                warn!(copy, sequence = self.tx_template.sequence, error = %e, "keying copy failed");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        self.tx_template.n = 0;
        debug!(
            sequence = self.tx_template.sequence,
            element, "keying event sent"
        );
        match first_error {
            Some(e) => Err(SessionError::Transport(e)),
            None => Ok(()),
        }
    }

    /// Leaves the channel.
    ///
    /// Sends the DIS packet once and moves the session to `Closed`.  Data
    /// packet state is untouched and the send handle stays open; dropping
    /// or closing it is the caller's job.
    ///
    /// # Errors
    ///
    /// [`SessionError::Transport`] if the send fails.  The session still
    /// transitions to `Closed`: a client that failed to say goodbye is gone
    /// either way.
    pub async fn disconnect(&mut self) -> Result<(), SessionError> {
        self.state = SessionState::Closed;
        self.sink.send_packet(&self.disconnect_packet).await?;
        debug!(channel = self.channel, "disconnected");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
