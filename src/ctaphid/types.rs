/// Channel id reserved for the INIT handshake.
pub const BROADCAST_CID: u32 = 0xFFFF_FFFF;

pub const CMD_PING: u8 = 0x01;
pub const CMD_MSG: u8 = 0x03;
pub const CMD_LOCK: u8 = 0x04;
pub const CMD_INIT: u8 = 0x06;
pub const CMD_WINK: u8 = 0x08;
pub const CMD_CBOR: u8 = 0x10;
pub const CMD_CANCEL: u8 = 0x11;
pub const CMD_KEEPALIVE: u8 = 0x3B;
pub const CMD_SYNC: u8 = 0x3C;
pub const CMD_ERROR: u8 = 0x3F;

pub const CAP_WINK: u8 = 0x01;
pub const CAP_CBOR: u8 = 0x04;
pub const CAP_NMSG: u8 = 0x08;

/// Bit 7 of the type byte distinguishes init from continuation frames.
pub const TYPE_INIT_MASK: u8 = 0x80;

pub const REPORT_SIZE: usize = 64;
pub const INIT_DATA_SIZE: usize = 57;
pub const CONT_DATA_SIZE: usize = 59;
/// 57 + 128 * 59: a longer message cannot be numbered in 7 sequence bits.
pub const MAX_PAYLOAD_SIZE: usize = 7609;

pub const INIT_NONCE_SIZE: usize = 8;
pub const INIT_RESPONSE_SIZE: usize = 17;

/// Unused payload bytes are set to this on send. Inbound frames may carry
/// anything in their tail; receivers never check it.
pub const FILL_BYTE: u8 = 0xEE;
