//! Binary codec for the two CWCom/MorseKOB packet layouts.
//!
//! Wire format (all multi-byte integers little-endian):
//! ```text
//! Command packet, 4 bytes:
//! [command:2][channel:2]
//!
//! Data packet, 496 bytes:
//! [command:2][length:2][id:128][reserved1:4][sequence:4]
//! [a21:4][a22:4][a23:4][code:51*4][n:4][status:128][reserved4:8]
//! ```
//!
//! # Why not cast a struct? (for beginners)
//!
//! The C lineage of this client `send()`s its packet structs directly, so the
//! wire layout is whatever the compiler's struct layout happens to be.  That
//! works only because every deployed target is little-endian x86 with the
//! same padding rules.  This codec instead writes every field at its
//! documented offset, so the emitted bytes are identical on any host –
//! including big-endian ones – and decoding never depends on `unsafe`
//! transmutes or `#[repr(C)]` layout guarantees.

use thiserror::Error;

use crate::protocol::packets::{
    CommandCode, DataPacket, DATA_PAYLOAD_LEN, SIZE_CODE, SIZE_COMMAND_PACKET, SIZE_DATA_PACKET,
    SIZE_ID, SIZE_STATUS,
};

// Field offsets within the 496-byte data packet.
const OFF_COMMAND: usize = 0;
const OFF_LENGTH: usize = 2;
const OFF_ID: usize = 4;
const OFF_SEQUENCE: usize = 136; // preceded by the 4-byte reserved1 slot
const OFF_A21: usize = 140;
const OFF_A22: usize = 144;
const OFF_A23: usize = 148;
const OFF_CODE: usize = 152;
const OFF_N: usize = 356;
const OFF_STATUS: usize = 360;
// bytes 488..496 are the reserved4 slot, zero-filled

/// Errors raised while encoding or decoding packets.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    /// The command code cannot head a command packet (only CON, DIS, and ACK
    /// use the 4-byte layout).
    #[error("command code 0x{0:04X} is not valid for a command packet")]
    InvalidCommand(u16),

    /// The buffer is shorter than the layout detected from its command code.
    #[error("short packet: need {needed} bytes, got {available}")]
    ShortPacket { needed: usize, available: usize },

    /// The first two bytes are not one of the four known command codes.
    #[error("unknown command code 0x{0:04X}")]
    UnknownCommand(u16),
}

/// A decoded packet, tagged by family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    /// A 4-byte command packet (CON, DIS, or ACK).
    Command { code: CommandCode, channel: u16 },
    /// A 496-byte data packet.  Boxed: the struct is nearly half a kilobyte
    /// and would otherwise bloat every `Packet` value.
    Data(Box<DataPacket>),
}

// ── Encoding ──────────────────────────────────────────────────────────────────

/// Encodes a 4-byte command packet.
///
/// # Errors
///
/// Returns [`WireError::InvalidCommand`] for [`CommandCode::Data`], which
/// heads the 496-byte layout and never travels alone.
pub fn encode_command(
    code: CommandCode,
    channel: u16,
) -> Result<[u8; SIZE_COMMAND_PACKET], WireError> {
    if code == CommandCode::Data {
        return Err(WireError::InvalidCommand(code as u16));
    }
    let mut buf = [0u8; SIZE_COMMAND_PACKET];
    buf[..2].copy_from_slice(&(code as u16).to_le_bytes());
    buf[2..].copy_from_slice(&channel.to_le_bytes());
    Ok(buf)
}

/// Encodes a 496-byte data packet.
///
/// Infallible: every [`DataPacket`] has a valid wire image.  The command and
/// length prefix and the two reserved regions are filled in here.
pub fn encode_data(pkt: &DataPacket) -> [u8; SIZE_DATA_PACKET] {
    let mut buf = [0u8; SIZE_DATA_PACKET];

    buf[OFF_COMMAND..OFF_COMMAND + 2].copy_from_slice(&(CommandCode::Data as u16).to_le_bytes());
    buf[OFF_LENGTH..OFF_LENGTH + 2].copy_from_slice(&DATA_PAYLOAD_LEN.to_le_bytes());
    buf[OFF_ID..OFF_ID + SIZE_ID].copy_from_slice(&pkt.id);
    // reserved1 at 132..136 stays zero
    buf[OFF_SEQUENCE..OFF_SEQUENCE + 4].copy_from_slice(&pkt.sequence.to_le_bytes());
    buf[OFF_A21..OFF_A21 + 4].copy_from_slice(&pkt.a21.to_le_bytes());
    buf[OFF_A22..OFF_A22 + 4].copy_from_slice(&pkt.a22.to_le_bytes());
    buf[OFF_A23..OFF_A23 + 4].copy_from_slice(&pkt.a23.to_le_bytes());
    for (i, element) in pkt.code.iter().enumerate() {
        let off = OFF_CODE + i * 4;
        buf[off..off + 4].copy_from_slice(&element.to_le_bytes());
    }
    buf[OFF_N..OFF_N + 4].copy_from_slice(&pkt.n.to_le_bytes());
    buf[OFF_STATUS..OFF_STATUS + SIZE_STATUS].copy_from_slice(&pkt.status);
    // reserved4 at 488..496 stays zero

    buf
}

// ── Decoding ──────────────────────────────────────────────────────────────────

/// Decodes one packet from `bytes`, dispatching on the leading command code.
///
/// # Errors
///
/// - [`WireError::ShortPacket`] if the buffer is smaller than the layout the
///   command code calls for.
/// - [`WireError::UnknownCommand`] if the first two bytes are not a known
///   code.
pub fn decode_packet(bytes: &[u8]) -> Result<Packet, WireError> {
    if bytes.len() < 2 {
        return Err(WireError::ShortPacket {
            needed: 2,
            available: bytes.len(),
        });
    }
    let raw = u16::from_le_bytes([bytes[0], bytes[1]]);
    let code = CommandCode::try_from(raw).map_err(|()| WireError::UnknownCommand(raw))?;

    match code {
        CommandCode::Data => decode_data(bytes).map(|pkt| Packet::Data(Box::new(pkt))),
        CommandCode::Connect | CommandCode::Disconnect | CommandCode::Ack => {
            if bytes.len() < SIZE_COMMAND_PACKET {
                return Err(WireError::ShortPacket {
                    needed: SIZE_COMMAND_PACKET,
                    available: bytes.len(),
                });
            }
            let channel = u16::from_le_bytes([bytes[2], bytes[3]]);
            Ok(Packet::Command { code, channel })
        }
    }
}

fn decode_data(bytes: &[u8]) -> Result<DataPacket, WireError> {
    if bytes.len() < SIZE_DATA_PACKET {
        return Err(WireError::ShortPacket {
            needed: SIZE_DATA_PACKET,
            available: bytes.len(),
        });
    }

    // The `length` field at bytes 2..4 is nominally always 492; peers in the
    // wild send nothing else, so it is not validated here.

    let mut id = [0u8; SIZE_ID];
    id.copy_from_slice(&bytes[OFF_ID..OFF_ID + SIZE_ID]);

    let mut code = [0i32; SIZE_CODE];
    for (i, element) in code.iter_mut().enumerate() {
        let off = OFF_CODE + i * 4;
        *element = i32::from_le_bytes(bytes[off..off + 4].try_into().expect("4-byte slice"));
    }

    let mut status = [0u8; SIZE_STATUS];
    status.copy_from_slice(&bytes[OFF_STATUS..OFF_STATUS + SIZE_STATUS]);

    Ok(DataPacket {
        id,
        sequence: read_u32(bytes, OFF_SEQUENCE),
        a21: read_u32(bytes, OFF_A21),
        a22: read_u32(bytes, OFF_A22),
        a23: read_u32(bytes, OFF_A23),
        code,
        n: read_u32(bytes, OFF_N),
        status,
    })
}

fn read_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(buf[offset..offset + 4].try_into().expect("4-byte slice"))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::packets::INTERFACE_VERSION;

    // ── Command packets ──────────────────────────────────────────────────────

    #[test]
    fn test_encode_connect_on_channel_103() {
        // The canonical join packet from the protocol description.
        let buf = encode_command(CommandCode::Connect, 103).unwrap();

        assert_eq!(buf, [0x04, 0x00, 0x67, 0x00]);
    }

    #[test]
    fn test_encode_disconnect_has_zero_channel() {
        let buf = encode_command(CommandCode::Disconnect, 0).unwrap();

        assert_eq!(buf, [0x02, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_encode_command_rejects_data_code() {
        let result = encode_command(CommandCode::Data, 103);

        assert_eq!(result, Err(WireError::InvalidCommand(0x0003)));
    }

    #[test]
    fn test_encode_ack_is_accepted() {
        let buf = encode_command(CommandCode::Ack, 5).unwrap();

        assert_eq!(buf, [0x05, 0x00, 0x05, 0x00]);
    }

    #[test]
    fn test_command_round_trip() {
        for (code, channel) in [
            (CommandCode::Connect, 103u16),
            (CommandCode::Connect, 5),
            (CommandCode::Disconnect, 0),
            (CommandCode::Ack, 0xFFFF),
        ] {
            let buf = encode_command(code, channel).unwrap();
            let decoded = decode_packet(&buf).unwrap();
            assert_eq!(decoded, Packet::Command { code, channel });
        }
    }

    // ── Data packets ─────────────────────────────────────────────────────────

    #[test]
    fn test_encode_id_packet_leading_bytes() {
        // DAT=0x0003, length=492=0x01EC, then "TEST\0…" – the representative
        // bytes from the wire-contract description.
        let buf = encode_data(&DataPacket::id_packet("TEST"));

        assert_eq!(buf.len(), SIZE_DATA_PACKET);
        assert_eq!(
            &buf[..9],
            &[0x03, 0x00, 0xEC, 0x01, 0x54, 0x45, 0x53, 0x54, 0x00]
        );
    }

    #[test]
    fn test_encode_data_field_offsets() {
        let mut pkt = DataPacket::id_packet("TEST");
        pkt.sequence = 7;
        pkt.code[0] = -1;
        pkt.code[1] = 2;
        pkt.n = 2;
        let buf = encode_data(&pkt);

        assert_eq!(&buf[132..136], &[0, 0, 0, 0], "reserved1 must be zero");
        assert_eq!(u32::from_le_bytes(buf[136..140].try_into().unwrap()), 7);
        assert_eq!(u32::from_le_bytes(buf[140..144].try_into().unwrap()), 1);
        assert_eq!(u32::from_le_bytes(buf[144..148].try_into().unwrap()), 755);
        assert_eq!(u32::from_le_bytes(buf[148..152].try_into().unwrap()), 65535);
        assert_eq!(i32::from_le_bytes(buf[152..156].try_into().unwrap()), -1);
        assert_eq!(i32::from_le_bytes(buf[156..160].try_into().unwrap()), 2);
        assert_eq!(u32::from_le_bytes(buf[356..360].try_into().unwrap()), 2);
        assert_eq!(&buf[360..371], INTERFACE_VERSION.as_bytes());
        assert_eq!(buf[371], 0, "status must be NUL-terminated");
        assert_eq!(&buf[488..496], &[0; 8], "reserved4 must be zero");
    }

    #[test]
    fn test_data_round_trip() {
        let mut pkt = DataPacket::tx_template("N0CALL");
        pkt.sequence = 42;
        pkt.code[0] = -250;
        pkt.code[1] = 120;
        pkt.code[2] = -90;
        pkt.n = 3;

        let buf = encode_data(&pkt);
        let decoded = decode_packet(&buf).unwrap();

        assert_eq!(decoded, Packet::Data(Box::new(pkt)));
    }

    #[test]
    fn test_id_packet_round_trip() {
        let pkt = DataPacket::id_packet("TEST");
        let decoded = decode_packet(&encode_data(&pkt)).unwrap();

        assert_eq!(decoded, Packet::Data(Box::new(pkt)));
    }

    // ── Decode error conditions ──────────────────────────────────────────────

    #[test]
    fn test_decode_empty_buffer_is_short() {
        let result = decode_packet(&[]);

        assert_eq!(
            result,
            Err(WireError::ShortPacket {
                needed: 2,
                available: 0
            })
        );
    }

    #[test]
    fn test_decode_truncated_command_is_short() {
        let result = decode_packet(&[0x04, 0x00, 0x67]);

        assert_eq!(
            result,
            Err(WireError::ShortPacket {
                needed: 4,
                available: 3
            })
        );
    }

    #[test]
    fn test_decode_truncated_data_is_short() {
        let mut bytes = encode_data(&DataPacket::id_packet("TEST")).to_vec();
        bytes.truncate(495);

        let result = decode_packet(&bytes);

        assert_eq!(
            result,
            Err(WireError::ShortPacket {
                needed: 496,
                available: 495
            })
        );
    }

    #[test]
    fn test_decode_unknown_command() {
        let result = decode_packet(&[0xFF, 0xFF]);

        assert_eq!(result, Err(WireError::UnknownCommand(0xFFFF)));
    }

    #[test]
    fn test_decode_recognises_ack() {
        // ACKs are informational; the codec must still classify them.
        let decoded = decode_packet(&[0x05, 0x00, 0x00, 0x00]).unwrap();

        assert_eq!(
            decoded,
            Packet::Command {
                code: CommandCode::Ack,
                channel: 0
            }
        );
    }

    #[test]
    fn test_decode_ignores_trailing_bytes_after_command() {
        // A command packet inside a larger datagram decodes from its prefix.
        let decoded = decode_packet(&[0x02, 0x00, 0x00, 0x00, 0xAA, 0xBB]).unwrap();

        assert_eq!(
            decoded,
            Packet::Command {
                code: CommandCode::Disconnect,
                channel: 0
            }
        );
    }
}
