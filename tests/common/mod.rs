#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use fidoscope::ctaphid::types::*;
use fidoscope::hid::{HidError, HidLink};

pub enum ReadStep {
    Frame([u8; REPORT_SIZE]),
    Timeout,
    Fail,
}

#[derive(Default)]
struct Inner {
    reads: VecDeque<ReadStep>,
    writes: Vec<Vec<u8>>,
    echo: bool,
    read_calls: usize,
    closed: bool,
}

/// Scripted HID device. Cloning shares the underlying state, so a test can
/// keep a handle while the session owns the other.
#[derive(Clone, Default)]
pub struct MockLink {
    inner: Rc<RefCell<Inner>>,
}

impl MockLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A link that feeds every written frame back as a read, as if the
    /// device echoed our own traffic.
    pub fn echoing() -> Self {
        let link = Self::default();
        link.inner.borrow_mut().echo = true;
        link
    }

    pub fn push_frame(&self, report: [u8; REPORT_SIZE]) {
        self.inner.borrow_mut().reads.push_back(ReadStep::Frame(report));
    }

    pub fn push_timeout(&self) {
        self.inner.borrow_mut().reads.push_back(ReadStep::Timeout);
    }

    pub fn push_failure(&self) {
        self.inner.borrow_mut().reads.push_back(ReadStep::Fail);
    }

    /// Script a whole device response, segmented the way a device would
    /// send it.
    pub fn push_response(&self, cid: u32, cmd: u8, payload: &[u8]) {
        let first = payload.len().min(INIT_DATA_SIZE);
        self.push_frame(init_report(cid, cmd, payload.len() as u16, &payload[..first]));

        let mut offset = first;
        let mut seq = 0u8;
        while offset < payload.len() {
            let chunk = (payload.len() - offset).min(CONT_DATA_SIZE);
            self.push_frame(cont_report(cid, seq, &payload[offset..offset + chunk]));
            offset += chunk;
            seq += 1;
        }
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.inner.borrow().writes.clone()
    }

    pub fn read_calls(&self) -> usize {
        self.inner.borrow().read_calls
    }

    pub fn is_closed(&self) -> bool {
        self.inner.borrow().closed
    }
}

impl HidLink for MockLink {
    fn write(&mut self, buf: &[u8]) -> Result<usize, HidError> {
        let mut inner = self.inner.borrow_mut();
        inner.writes.push(buf.to_vec());
        if inner.echo {
            let mut report = [0u8; REPORT_SIZE];
            report.copy_from_slice(&buf[1..]);
            inner.reads.push_back(ReadStep::Frame(report));
        }
        Ok(buf.len())
    }

    fn read(&mut self, buf: &mut [u8], _timeout_ms: u64) -> Result<usize, HidError> {
        let mut inner = self.inner.borrow_mut();
        inner.read_calls += 1;
        match inner.reads.pop_front() {
            Some(ReadStep::Frame(report)) => {
                buf[..REPORT_SIZE].copy_from_slice(&report);
                Ok(REPORT_SIZE)
            }
            Some(ReadStep::Timeout) | None => Ok(0),
            Some(ReadStep::Fail) => Err(HidError::Read("scripted failure".into())),
        }
    }

    fn close(&mut self) {
        self.inner.borrow_mut().closed = true;
    }
}

pub fn init_report(cid: u32, cmd: u8, bcnt: u16, chunk: &[u8]) -> [u8; REPORT_SIZE] {
    let mut report = [0u8; REPORT_SIZE];
    report[0..4].copy_from_slice(&cid.to_be_bytes());
    report[4] = TYPE_INIT_MASK | cmd;
    report[5..7].copy_from_slice(&bcnt.to_be_bytes());
    report[7..7 + chunk.len()].copy_from_slice(chunk);
    report
}

pub fn cont_report(cid: u32, seq: u8, chunk: &[u8]) -> [u8; REPORT_SIZE] {
    let mut report = [0u8; REPORT_SIZE];
    report[0..4].copy_from_slice(&cid.to_be_bytes());
    report[4] = seq;
    report[5..5 + chunk.len()].copy_from_slice(chunk);
    report
}

/// The nonce a seeded session will draw first, computed from an identical
/// RNG so responses can be scripted before `init` runs.
pub fn nonce_for_seed(seed: u64) -> [u8; INIT_NONCE_SIZE] {
    use rand::{Rng, SeedableRng, rngs::StdRng};
    let mut rng = StdRng::seed_from_u64(seed);
    let mut nonce = [0u8; INIT_NONCE_SIZE];
    rng.fill(&mut nonce[..]);
    nonce
}

/// INIT response payload: nonce echo, allocated cid, versions, capability
/// byte.
pub fn init_response(nonce: &[u8; INIT_NONCE_SIZE], cid: u32, caps: u8) -> Vec<u8> {
    let mut payload = Vec::with_capacity(INIT_RESPONSE_SIZE);
    payload.extend_from_slice(nonce);
    payload.extend_from_slice(&cid.to_be_bytes());
    payload.extend_from_slice(&[2, 0, 1, 0]);
    payload.push(caps);
    payload
}
