mod common;

use common::{MockLink, init_report, init_response, nonce_for_seed};
use fidoscope::Session;
use fidoscope::ctaphid::Status;
use fidoscope::ctaphid::types::*;
use rand::{SeedableRng, rngs::StdRng};

const SEED: u64 = 11;
const CID: u32 = 0xCAFE_F00D;
const GET_INFO: u8 = 0x04;

/// A session that already completed the INIT handshake on `CID`.
fn ready_session(link: &MockLink) -> Session<MockLink> {
    let nonce = nonce_for_seed(SEED);
    link.push_frame(init_report(
        BROADCAST_CID,
        CMD_INIT,
        INIT_RESPONSE_SIZE as u16,
        &init_response(&nonce, CID, 0x05),
    ));
    let mut session = Session::with_rng(link.clone(), StdRng::seed_from_u64(SEED));
    session.init().unwrap();
    session
}

#[test]
fn test_exchange_with_up_keepalive() {
    let link = MockLink::new();
    let mut session = ready_session(&link);

    link.push_frame(init_report(CID, CMD_KEEPALIVE, 1, &[2]));
    link.push_frame(init_report(CID, CMD_CBOR, 4, &[0x00, 0x81, 0x18, 0x2A]));

    let response = session.exchange_cbor(GET_INFO, &[], true).unwrap();
    assert_eq!(response, vec![0x81, 0x18, 0x2A]);

    // The request went out as one CBOR init frame: command byte, no payload.
    let request = &link.writes()[1];
    assert_eq!(&request[1..5], &CID.to_be_bytes());
    assert_eq!(request[5], TYPE_INIT_MASK | CMD_CBOR);
    assert_eq!(u16::from_be_bytes([request[6], request[7]]), 1);
    assert_eq!(request[8], GET_INFO);
}

#[test]
fn test_exchange_drains_processing_keepalives() {
    let link = MockLink::new();
    let mut session = ready_session(&link);

    link.push_frame(init_report(CID, CMD_KEEPALIVE, 1, &[1]));
    link.push_frame(init_report(CID, CMD_KEEPALIVE, 1, &[1]));
    link.push_frame(init_report(CID, CMD_KEEPALIVE, 1, &[2]));
    link.push_frame(init_report(CID, CMD_CBOR, 1, &[0x00]));

    let response = session.exchange_cbor(GET_INFO, &[0xA0], true).unwrap();
    assert!(response.is_empty());
}

#[test]
fn test_vendor_status_collapses_to_other() {
    let link = MockLink::new();
    let mut session = ready_session(&link);

    link.push_frame(init_report(CID, CMD_CBOR, 2, &[0xF2, 0x00]));
    let err = session.exchange_cbor(GET_INFO, &[], false).unwrap_err();
    assert_eq!(err, Status::Other);
}

#[test]
fn test_deprecated_status_collapses_to_other() {
    let link = MockLink::new();
    let mut session = ready_session(&link);

    link.push_frame(init_report(CID, CMD_CBOR, 1, &[0x10]));
    assert_eq!(session.exchange_cbor(GET_INFO, &[], false).unwrap_err(), Status::Other);
}

#[test]
fn test_known_error_status_is_returned_as_is() {
    let link = MockLink::new();
    let mut session = ready_session(&link);

    link.push_frame(init_report(CID, CMD_CBOR, 1, &[Status::PinRequired.byte()]));
    assert_eq!(
        session.exchange_cbor(GET_INFO, &[], false).unwrap_err(),
        Status::PinRequired
    );
}

#[test]
#[should_panic(expected = "unspecified")]
fn test_unspecified_status_byte_panics() {
    let link = MockLink::new();
    let mut session = ready_session(&link);

    link.push_frame(init_report(CID, CMD_CBOR, 1, &[0x7E]));
    let _ = session.exchange_cbor(GET_INFO, &[], false);
}

#[test]
fn test_unexpected_opcode_fails_exchange() {
    let link = MockLink::new();
    let mut session = ready_session(&link);

    link.push_frame(init_report(CID, CMD_MSG, 1, &[0x00]));
    assert_eq!(
        session.exchange_cbor(GET_INFO, &[], false).unwrap_err(),
        Status::InvalidCommand
    );
}

#[test]
fn test_empty_cbor_response_fails_exchange() {
    let link = MockLink::new();
    let mut session = ready_session(&link);

    link.push_frame(init_report(CID, CMD_CBOR, 0, &[]));
    assert_eq!(
        session.exchange_cbor(GET_INFO, &[], false).unwrap_err(),
        Status::InvalidLength
    );
}

#[test]
fn test_bad_keepalive_byte_fails_exchange() {
    let link = MockLink::new();
    let mut session = ready_session(&link);

    link.push_frame(init_report(CID, CMD_KEEPALIVE, 1, &[7]));
    assert_eq!(session.exchange_cbor(GET_INFO, &[], false).unwrap_err(), Status::Other);
}

#[test]
fn test_oversized_request_is_rejected_before_sending() {
    let link = MockLink::new();
    let mut session = ready_session(&link);
    let writes_before = link.writes().len();

    // Payload alone fits, but the prepended command byte pushes it over.
    let payload = vec![0u8; MAX_PAYLOAD_SIZE];
    assert_eq!(
        session.exchange_cbor(GET_INFO, &payload, false).unwrap_err(),
        Status::InvalidLength
    );
    assert_eq!(link.writes().len(), writes_before);
}

#[test]
fn test_device_error_frame_during_exchange() {
    let link = MockLink::new();
    let mut session = ready_session(&link);

    link.push_frame(init_report(CID, CMD_ERROR, 1, &[Status::InvalidChannel.byte()]));
    assert_eq!(
        session.exchange_cbor(GET_INFO, &[], false).unwrap_err(),
        Status::InvalidChannel
    );
}

#[test]
fn test_wink_round_trip() {
    let link = MockLink::new();
    let mut session = ready_session(&link);
    assert_eq!(session.observed_wink(), None);

    link.push_frame(init_report(CID, CMD_WINK, 0, &[]));
    session.wink().unwrap();
    assert_eq!(session.observed_wink(), Some(true));
}

#[test]
fn test_wink_with_payload_is_invalid() {
    let link = MockLink::new();
    let mut session = ready_session(&link);

    link.push_frame(init_report(CID, CMD_WINK, 1, &[0x00]));
    assert_eq!(session.wink().unwrap_err(), Status::InvalidLength);
    assert_eq!(session.observed_wink(), Some(false));
}

#[test]
fn test_wink_wrong_opcode_is_invalid_command() {
    let link = MockLink::new();
    let mut session = ready_session(&link);

    link.push_frame(init_report(CID, CMD_PING, 0, &[]));
    assert_eq!(session.wink().unwrap_err(), Status::InvalidCommand);
    assert_eq!(session.observed_wink(), Some(false));
}

#[test]
fn test_ping_echoes_multi_frame_payload() {
    let link = MockLink::new();
    let mut session = ready_session(&link);

    let payload: Vec<u8> = (0u16..200).map(|i| i as u8).collect();
    link.push_response(CID, CMD_PING, &payload);

    let echo = session.ping(&payload).unwrap();
    assert_eq!(echo, payload);

    // One init frame and three continuations went out after the handshake.
    let writes = link.writes();
    assert_eq!(writes.len(), 1 + 4);
}
