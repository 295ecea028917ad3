//! Protocol module containing packet types, the binary codec, and the
//! transmit sequence counter.

pub mod codec;
pub mod packets;
pub mod sequence;

pub use codec::{decode_packet, encode_command, encode_data, Packet, WireError};
pub use packets::*;
pub use sequence::SequenceCounter;
