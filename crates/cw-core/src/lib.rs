//! # cw-core
//!
//! Wire-protocol layer for the legacy CWCom/MorseKOB Morse-telegraphy relay
//! protocol: packet codec, session state, and the client keying engine.
//!
//! This crate carries the only real external contract in the workspace –
//! the bytes it emits must be bit-exact compatible with servers and clients
//! that have been running unchanged for decades.  It has zero dependencies
//! on sockets or OS APIs; the send side is a trait ([`PacketSink`]) that the
//! runnable client implements over UDP.
//!
//! # How the protocol works (for beginners)
//!
//! A CWCom/MorseKOB server hosts numbered *channels* (the default is 103).
//! Every client on a channel receives every other client's keying events, so
//! a channel behaves like a shared telegraph wire.  A client's life is
//! simple:
//!
//! 1. Send a 4-byte CON packet to join a channel, then a 496-byte data
//!    packet announcing its id ("identify").
//! 2. For every key-down send a *latch* data packet, for every key-up an
//!    *unlatch* – each five times in a row over UDP, because losses are
//!    expected and receivers deduplicate on the sequence number.
//! 3. Send a 4-byte DIS packet to leave.
//!
//! This crate defines:
//!
//! - **`protocol`** – the two fixed-size packet layouts, their little-endian
//!   codec, and the transmit sequence counter.
//! - **`session`** – the session record and the four engine operations
//!   (`identify`, `send_latch`, `send_unlatch`, `disconnect`).

pub mod protocol;
pub mod session;

// Re-export the most-used types at the crate root so callers can write
// `cw_core::Session` instead of `cw_core::session::Session`.
pub use protocol::codec::{decode_packet, encode_command, encode_data, Packet, WireError};
pub use protocol::packets::{CommandCode, DataPacket, DEFAULT_CHANNEL, INTERFACE_VERSION};
pub use session::{PacketSink, Session, SessionError, SessionState, REDUNDANT_SENDS};
