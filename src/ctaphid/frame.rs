use super::types::*;

/// One 64-byte CTAPHID report. The channel id is host-endian here;
/// byte-order conversion happens only in `encode`/`decode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    Init {
        cid: u32,
        /// Command opcode, low 7 bits. The init bit is applied on encode.
        cmd: u8,
        /// Declared length of the whole message, not of this frame.
        bcnt: u16,
        data: [u8; INIT_DATA_SIZE],
    },
    Cont {
        cid: u32,
        seq: u8,
        data: [u8; CONT_DATA_SIZE],
    },
}

impl Frame {
    /// Build an init frame, padding unused payload space with `FILL_BYTE`.
    pub fn init(cid: u32, cmd: u8, bcnt: u16, payload: &[u8]) -> Self {
        let mut data = [FILL_BYTE; INIT_DATA_SIZE];
        let len = payload.len().min(INIT_DATA_SIZE);
        data[..len].copy_from_slice(&payload[..len]);
        Frame::Init { cid, cmd, bcnt, data }
    }

    /// Build a continuation frame, padding unused payload space with `FILL_BYTE`.
    pub fn cont(cid: u32, seq: u8, payload: &[u8]) -> Self {
        let mut data = [FILL_BYTE; CONT_DATA_SIZE];
        let len = payload.len().min(CONT_DATA_SIZE);
        data[..len].copy_from_slice(&payload[..len]);
        Frame::Cont { cid, seq, data }
    }

    pub fn cid(&self) -> u32 {
        match *self {
            Frame::Init { cid, .. } | Frame::Cont { cid, .. } => cid,
        }
    }

    pub fn is_init(&self) -> bool {
        matches!(self, Frame::Init { .. })
    }

    /// Serialize for `HidLink::write`: one leading zero byte for the
    /// un-numbered HID report, then the 64 frame bytes with `cid` and
    /// `bcnt` in network order.
    pub fn encode(&self) -> [u8; REPORT_SIZE + 1] {
        let mut report = [0u8; REPORT_SIZE + 1];
        let body = &mut report[1..];
        match *self {
            Frame::Init { cid, cmd, bcnt, ref data } => {
                body[0..4].copy_from_slice(&cid.to_be_bytes());
                body[4] = TYPE_INIT_MASK | cmd;
                body[5..7].copy_from_slice(&bcnt.to_be_bytes());
                body[7..].copy_from_slice(data);
            }
            Frame::Cont { cid, seq, ref data } => {
                body[0..4].copy_from_slice(&cid.to_be_bytes());
                body[4] = seq;
                body[5..].copy_from_slice(data);
            }
        }
        report
    }

    /// Parse a received report. Total: every byte pattern is some frame.
    pub fn decode(report: &[u8; REPORT_SIZE]) -> Frame {
        let cid = u32::from_be_bytes([report[0], report[1], report[2], report[3]]);
        let kind = report[4];

        if kind & TYPE_INIT_MASK != 0 {
            let bcnt = u16::from_be_bytes([report[5], report[6]]);
            let mut data = [0u8; INIT_DATA_SIZE];
            data.copy_from_slice(&report[7..]);
            Frame::Init { cid, cmd: kind & !TYPE_INIT_MASK, bcnt, data }
        } else {
            let mut data = [0u8; CONT_DATA_SIZE];
            data.copy_from_slice(&report[5..]);
            Frame::Cont { cid, seq: kind, data }
        }
    }
}
