//! Integration tests for the wire contract of a complete session.
//!
//! These drive the public API only – `Session` over the in-memory recording
//! sink – and assert the exact byte sequences a conforming client emits for
//! the representative session in the protocol description: identify on
//! channel 103 as "TEST", latch, unlatch, disconnect.

use cw_core::protocol::packets::{SIZE_COMMAND_PACKET, SIZE_DATA_PACKET};
use cw_core::{decode_packet, CommandCode, Packet, Session, INTERFACE_VERSION, REDUNDANT_SENDS};

/// Runs the canonical session and returns every emitted datagram in order.
async fn canonical_session() -> Vec<Vec<u8>> {
    let mut session = Session::new(Vec::new(), 103, "TEST");
    session.identify().await.expect("identify");
    session.send_latch().await.expect("latch");
    session.send_unlatch().await.expect("unlatch");
    session.disconnect().await.expect("disconnect");
    session.into_sink()
}

#[tokio::test]
async fn test_canonical_session_datagram_count_and_sizes() {
    let sent = canonical_session().await;

    // CON + id + 5 latch + 5 unlatch + DIS
    assert_eq!(sent.len(), 2 + 2 * REDUNDANT_SENDS + 1);
    assert_eq!(sent[0].len(), SIZE_COMMAND_PACKET);
    assert_eq!(sent.last().unwrap().len(), SIZE_COMMAND_PACKET);
    for data in &sent[1..sent.len() - 1] {
        assert_eq!(data.len(), SIZE_DATA_PACKET);
    }
}

#[tokio::test]
async fn test_canonical_session_exact_command_bytes() {
    let sent = canonical_session().await;

    assert_eq!(sent[0], [0x04, 0x00, 0x67, 0x00], "CON on channel 103");
    assert_eq!(sent.last().unwrap(), &[0x02, 0x00, 0x00, 0x00], "DIS");
}

#[tokio::test]
async fn test_canonical_session_data_packet_fields() {
    let sent = canonical_session().await;

    let packets: Vec<_> = sent[1..sent.len() - 1]
        .iter()
        .map(|bytes| match decode_packet(bytes).expect("decode") {
            Packet::Data(data) => *data,
            other => panic!("expected data packet, got {other:?}"),
        })
        .collect();

    // Every data packet: length/magic invariants.
    for pkt in &packets {
        assert_eq!(pkt.a22, 755);
        assert_eq!(pkt.id_str(), "TEST");
    }

    // Id packet: sequence 1, id magics, interface version.
    let id = &packets[0];
    assert_eq!(id.sequence, 1);
    assert_eq!((id.a21, id.a23), (1, 65535));
    assert_eq!(id.n, 0);
    assert_eq!(id.status_str(), INTERFACE_VERSION);

    // Latch burst: five identical packets, sequence 2, code [-1, 1].
    let latch = &packets[1..1 + REDUNDANT_SENDS];
    for pkt in latch {
        assert_eq!(pkt, &latch[0]);
    }
    assert_eq!(latch[0].sequence, 2);
    assert_eq!((latch[0].a21, latch[0].a23), (0, 16777215));
    assert_eq!(latch[0].n, 2);
    assert_eq!(&latch[0].code[..2], &[-1, 1]);

    // Unlatch burst: sequence 3, code [-1, 2].
    let unlatch = &packets[1 + REDUNDANT_SENDS..];
    for pkt in unlatch {
        assert_eq!(pkt, &unlatch[0]);
    }
    assert_eq!(unlatch[0].sequence, 3);
    assert_eq!(unlatch[0].n, 2);
    assert_eq!(&unlatch[0].code[..2], &[-1, 2]);
}

#[tokio::test]
async fn test_every_emitted_packet_decodes() {
    // Whatever the engine emits, the codec must classify: the client's own
    // traffic echoed back by the server is the common inbound case.
    let sent = canonical_session().await;

    for bytes in &sent {
        let packet = decode_packet(bytes).expect("emitted packets must decode");
        match packet {
            Packet::Command { code, .. } => {
                assert!(matches!(code, CommandCode::Connect | CommandCode::Disconnect));
            }
            Packet::Data(data) => assert_eq!(data.id_str(), "TEST"),
        }
    }
}
