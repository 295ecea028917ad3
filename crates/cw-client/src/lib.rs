//! cw-client library entry point.
//!
//! Re-exports the client's modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does cw-client do? (for beginners)
//!
//! `cw-core` implements the wire protocol but deliberately knows nothing
//! about sockets, files, or operators.  This crate supplies the rest of a
//! working client:
//!
//! 1. Loads the TOML configuration (server, channel, client id).
//! 2. Opens and connects the UDP socket ([`net::UdpTransport`]).
//! 3. Joins the channel and announces the id (`Session::identify`).
//! 4. Turns stdin lines into latch/unlatch keying events ([`keyer`]).
//! 5. Decodes inbound datagrams and feeds them to `Session::observe`.
//! 6. Re-identifies on a timer so the server keeps the client on the
//!    channel, and sends the disconnect packet on the way out.

/// TOML configuration loading.
pub mod config;

/// Operator input parsing.
pub mod keyer;

/// UDP transport and inbound packet decoding.
pub mod net;
