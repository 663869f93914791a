use std::time::{Duration, Instant};

use crate::hid::HidLink;

use super::frame::Frame;
use super::status::Status;
use super::types::*;

/// Frame-level send/receive on one HID link. Owns the link and the channel
/// id the device allocated for this connection.
pub struct Transport<L: HidLink> {
    link: L,
    cid: u32,
}

impl<L: HidLink> Transport<L> {
    /// Starts on the broadcast channel; `set_cid` adopts the id the device
    /// hands out during INIT.
    pub fn new(link: L) -> Self {
        Self { link, cid: BROADCAST_CID }
    }

    pub fn cid(&self) -> u32 {
        self.cid
    }

    pub fn set_cid(&mut self, cid: u32) {
        self.cid = cid;
    }

    pub(crate) fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Segment `data` into one init frame plus as many continuation frames
    /// as needed, sequence numbers counting up from zero.
    pub fn send_command(&mut self, cmd: u8, data: &[u8]) -> Result<(), Status> {
        if data.len() > MAX_PAYLOAD_SIZE {
            return Err(Status::InvalidLength);
        }

        let first = data.len().min(INIT_DATA_SIZE);
        self.send_frame(&Frame::init(self.cid, cmd, data.len() as u16, &data[..first]))?;

        let mut offset = first;
        let mut seq = 0u8;
        while offset < data.len() {
            let chunk = (data.len() - offset).min(CONT_DATA_SIZE);
            self.send_frame(&Frame::cont(self.cid, seq, &data[offset..offset + chunk]))?;
            offset += chunk;
            seq += 1;
        }
        Ok(())
    }

    /// Reassemble one message addressed to our channel. The deadline covers
    /// the whole message; every read gets only the remaining budget.
    ///
    /// Frames on other channels are legitimate bus noise and are skipped.
    /// An init frame on our channel in the middle of a message is a
    /// protocol violation.
    pub fn receive_command(&mut self, timeout: Duration) -> Result<(u8, Vec<u8>), Status> {
        let deadline = Instant::now() + timeout;

        let (cmd, bcnt, first) = loop {
            match self.receive_frame(remaining(deadline))? {
                Frame::Init { cid, cmd, bcnt, data } if cid == self.cid => break (cmd, bcnt, data),
                _ => continue,
            }
        };

        if cmd == CMD_ERROR {
            return Err(Status::from_wire(first[0]));
        }

        let total = bcnt as usize;
        if total > MAX_PAYLOAD_SIZE {
            return Err(Status::InvalidLength);
        }

        let mut payload = Vec::with_capacity(total);
        payload.extend_from_slice(&first[..total.min(INIT_DATA_SIZE)]);

        let mut expected_seq = 0u8;
        while payload.len() < total {
            match self.receive_frame(remaining(deadline))? {
                Frame::Init { cid, .. } if cid == self.cid => return Err(Status::InvalidSeq),
                Frame::Cont { cid, seq, data } if cid == self.cid => {
                    if seq != expected_seq {
                        return Err(Status::InvalidSeq);
                    }
                    expected_seq += 1;
                    let chunk = (total - payload.len()).min(CONT_DATA_SIZE);
                    payload.extend_from_slice(&data[..chunk]);
                }
                _ => continue,
            }
        }

        Ok((cmd, payload))
    }

    /// One frame, one HID write of exactly 65 bytes.
    pub(crate) fn send_frame(&mut self, frame: &Frame) -> Result<(), Status> {
        let report = frame.encode();
        match self.link.write(&report) {
            Ok(written) if written == report.len() => {
                trace_frame(">> send >>", frame);
                Ok(())
            }
            Ok(written) => {
                tracing::warn!(written, "short HID write");
                Err(Status::Other)
            }
            Err(e) => {
                tracing::warn!("HID write failed: {e}");
                Err(Status::Other)
            }
        }
    }

    /// One blocking read bounded by `budget`. A zero budget times out
    /// without touching the link.
    pub(crate) fn receive_frame(&mut self, budget: Duration) -> Result<Frame, Status> {
        if budget.is_zero() {
            return Err(Status::Timeout);
        }

        let mut report = [0u8; REPORT_SIZE];
        match self.link.read(&mut report, budget.as_millis() as u64) {
            Ok(len) if len == REPORT_SIZE => {
                let frame = Frame::decode(&report);
                trace_frame("<< recv <<", &frame);
                Ok(frame)
            }
            Ok(_) => {
                tracing::trace!("timeout");
                Err(Status::Timeout)
            }
            Err(e) => {
                tracing::warn!("HID read failed: {e}");
                Err(Status::Other)
            }
        }
    }
}

fn remaining(deadline: Instant) -> Duration {
    deadline.saturating_duration_since(Instant::now())
}

fn trace_frame(direction: &str, frame: &Frame) {
    match frame {
        Frame::Init { cid, cmd, bcnt, data } => tracing::trace!(
            "{direction} {cid:08x}: {:02x}[{bcnt}]: {}",
            TYPE_INIT_MASK | cmd,
            crate::diagnostics::hex_string(data),
        ),
        Frame::Cont { cid, seq, data } => tracing::trace!(
            "{direction} {cid:08x}: seq={seq:02x}: {}",
            crate::diagnostics::hex_string(data),
        ),
    }
}
