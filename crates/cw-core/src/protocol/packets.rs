//! Packet types and wire constants for the CWCom/MorseKOB relay protocol.
//!
//! The protocol dates back to the MorseKOB 2.x servers and is frozen: every
//! constant in this module is part of the external contract and must match
//! what existing servers and clients put on the wire, byte for byte.
//!
//! Two packet families exist:
//!
//! - **Command packets** (4 bytes) – join or leave a channel.
//! - **Data packets** (496 bytes) – identification and keying events.
//!
//! # Why fixed-size packets? (for beginners)
//!
//! The servers were written in an era when "serialization" meant copying a C
//! struct straight onto a UDP socket.  There is no length-prefixed framing
//! and no versioned schema: a receiver recognises a packet purely by its
//! first two bytes (the command code) and its total size.  That is why the
//! structs below carry fixed-width byte arrays instead of `String`s – the id
//! field is *always* 128 bytes on the wire, NUL-padded, whether the operator
//! callsign is 2 characters or 120.

// ── Protocol constants ────────────────────────────────────────────────────────

/// Interface-version string advertised in the `status` field of the id
/// packet.  Servers use it to recognise the client implementation.
pub const INTERFACE_VERSION: &str = "irmc v0.3.3";

/// Size of a command packet on the wire, in bytes.
pub const SIZE_COMMAND_PACKET: usize = 4;

/// Size of a data packet on the wire, in bytes.
pub const SIZE_DATA_PACKET: usize = 496;

/// Value of the `length` field of every data packet: the packet size minus
/// the 4-byte command/length prefix.
pub const DATA_PAYLOAD_LEN: u16 = 492;

/// Width of the `id` field, in bytes (includes the NUL terminator slot).
pub const SIZE_ID: usize = 128;

/// Width of the `status` field, in bytes.
pub const SIZE_STATUS: usize = 128;

/// Number of entries in the `code` array.
pub const SIZE_CODE: usize = 51;

/// Channel joined when the operator has not picked one.
pub const DEFAULT_CHANNEL: u16 = 103;

// ── Command codes ─────────────────────────────────────────────────────────────

/// The four command codes defined by the protocol.
///
/// The numeric values are fixed by the MorseKOB servers.  Note that the
/// codes are 16-bit on the wire even though only four values exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum CommandCode {
    /// Leave the current channel.
    Disconnect = 0x0002,
    /// A 496-byte data packet follows this code.
    Data = 0x0003,
    /// Join a channel.
    Connect = 0x0004,
    /// Informational acknowledgement; fire-and-forget, never acted on.
    Ack = 0x0005,
}

impl TryFrom<u16> for CommandCode {
    type Error = ();

    fn try_from(value: u16) -> Result<Self, ()> {
        match value {
            0x0002 => Ok(CommandCode::Disconnect),
            0x0003 => Ok(CommandCode::Data),
            0x0004 => Ok(CommandCode::Connect),
            0x0005 => Ok(CommandCode::Ack),
            _ => Err(()),
        }
    }
}

// ── Data packet ───────────────────────────────────────────────────────────────

/// One 496-byte data packet, used both for identification and keying events.
///
/// The `command` (always [`CommandCode::Data`]) and `length` (always
/// [`DATA_PAYLOAD_LEN`]) prefix fields are not stored here; the codec writes
/// them on encode and checks them on decode.  The two reserved regions of
/// the wire layout are likewise zero-filled by the codec.
///
/// Instances are used as *mutable prototypes*: the session prepares one id
/// packet and one transmit template at start-up, then patches `sequence`,
/// `code`, and `n` in place before each send.
#[derive(Clone, PartialEq, Eq)]
pub struct DataPacket {
    /// NUL-padded ASCII client identifier.
    pub id: [u8; SIZE_ID],
    /// Monotonic transmit counter; receivers deduplicate on it.
    pub sequence: u32,
    /// Magic: 1 for id packets, 0 for keying packets.
    pub a21: u32,
    /// Magic: always 755.
    pub a22: u32,
    /// Magic: 65535 for id packets, 16777215 for keying packets.
    pub a23: u32,
    /// Keying code elements; only the first `n` entries are meaningful.
    pub code: [i32; SIZE_CODE],
    /// Count of valid entries in `code`.
    pub n: u32,
    /// NUL-padded status text: the interface version on id packets, the most
    /// recently sent character (default `"?"`) on keying packets.
    pub status: [u8; SIZE_STATUS],
}

impl DataPacket {
    /// Prepares the identification packet prototype for `id`.
    ///
    /// The magic values (`a21=1`, `a22=755`, `a23=65535`) were established by
    /// the original MorseKOB servers and must not change.
    pub fn id_packet(id: &str) -> Self {
        Self {
            id: fixed_bytes(id),
            sequence: 0,
            a21: 1,
            a22: 755,
            a23: 65535,
            code: [0; SIZE_CODE],
            n: 0,
            status: fixed_bytes(INTERFACE_VERSION),
        }
    }

    /// Prepares the transmit template prototype for `id`.
    ///
    /// The whole `code` array is zeroed here, including `code[0]` which the
    /// engine overwrites per keying event.  The C lineage left `code[0]`
    /// uninitialised at this point; zeroing it makes every emitted byte
    /// deterministic.
    pub fn tx_template(id: &str) -> Self {
        Self {
            id: fixed_bytes(id),
            sequence: 0,
            a21: 0,
            a22: 755,
            a23: 16777215,
            code: [0; SIZE_CODE],
            n: 0,
            status: fixed_bytes("?"),
        }
    }

    /// Returns the client identifier as text, up to the first NUL.
    pub fn id_str(&self) -> String {
        fixed_str(&self.id)
    }

    /// Returns the status field as text, up to the first NUL.
    pub fn status_str(&self) -> String {
        fixed_str(&self.status)
    }
}

impl std::fmt::Debug for DataPacket {
    // The two 128-byte arrays and the 51-entry code array drown out the
    // interesting fields in derived output, so format them compactly.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataPacket")
            .field("id", &self.id_str())
            .field("sequence", &self.sequence)
            .field("a21", &self.a21)
            .field("a22", &self.a22)
            .field("a23", &self.a23)
            .field("code", &&self.code[..self.n.min(SIZE_CODE as u32) as usize])
            .field("n", &self.n)
            .field("status", &self.status_str())
            .finish()
    }
}

// ── Fixed-width string helpers ────────────────────────────────────────────────

/// Copies `s` into a fixed-width field, truncated to `N - 1` bytes and
/// NUL-padded to the full width.
///
/// Truncating to `N - 1` rather than `N` keeps the terminator slot free,
/// matching the `snprintf` calls in the C lineage.
pub(crate) fn fixed_bytes<const N: usize>(s: &str) -> [u8; N] {
    let mut out = [0u8; N];
    let len = s.len().min(N - 1);
    out[..len].copy_from_slice(&s.as_bytes()[..len]);
    out
}

/// Reads a fixed-width field back into text, stopping at the first NUL.
///
/// The field is nominally ASCII but is treated as opaque bytes on the wire,
/// so a lossy conversion is used rather than failing on stray bytes.
pub(crate) fn fixed_str(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
