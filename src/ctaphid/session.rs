use std::time::Duration;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::config::RECEIVE_TIMEOUT_MS;
use crate::diagnostics;
use crate::hid::HidLink;

use super::exchange::ExchangeState;
use super::frame::Frame;
use super::status::{Status, StatusClass, classify};
use super::transport::Transport;
use super::types::*;

/// The nonce only correlates an INIT request with its response on a shared
/// bus; it carries no security weight, so a fixed seed keeps runs
/// reproducible.
const NONCE_SEED: u64 = 0xF1D0;

/// Feature flags from byte 16 of the INIT response. NMSG is a negative
/// flag on the wire: a set bit means CTAP1 messages are NOT supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub supports_wink: bool,
    pub supports_cbor: bool,
    pub supports_msg: bool,
}

impl Capabilities {
    fn from_byte(caps: u8) -> Self {
        Self {
            supports_wink: caps & CAP_WINK != 0,
            supports_cbor: caps & CAP_CBOR != 0,
            supports_msg: caps & CAP_NMSG == 0,
        }
    }
}

/// One connection to a security key. Created closed; `init` runs the
/// broadcast handshake and adopts the allocated channel id.
pub struct Session<L: HidLink> {
    transport: Transport<L>,
    capabilities: Option<Capabilities>,
    observed_wink: Option<bool>,
    rng: StdRng,
}

impl<L: HidLink> Session<L> {
    /// Deterministic nonce source, the default for reproducible runs.
    pub fn open(link: L) -> Self {
        Self::with_rng(link, StdRng::seed_from_u64(NONCE_SEED))
    }

    /// OS-entropy nonce source for callers that want fresh randomness.
    pub fn open_with_entropy(link: L) -> Self {
        Self::with_rng(link, StdRng::from_entropy())
    }

    pub fn with_rng(link: L, rng: StdRng) -> Self {
        Self {
            transport: Transport::new(link),
            capabilities: None,
            observed_wink: None,
            rng,
        }
    }

    pub fn cid(&self) -> u32 {
        self.transport.cid()
    }

    pub fn capabilities(&self) -> Option<&Capabilities> {
        self.capabilities.as_ref()
    }

    /// Outcome of the last `wink` attempt, if any.
    pub fn observed_wink(&self) -> Option<bool> {
        self.observed_wink
    }

    pub fn close(mut self) {
        self.transport.link_mut().close();
    }

    /// CTAPHID_INIT handshake on the broadcast channel. May be called again
    /// to re-key the channel; a fresh nonce is drawn each time.
    ///
    /// Responses are matched by nonce: anything else on the broadcast
    /// channel is another initiator's traffic and is discarded.
    pub fn init(&mut self) -> Result<(), Status> {
        self.capabilities = None;
        self.transport.set_cid(BROADCAST_CID);

        let mut nonce = [0u8; INIT_NONCE_SIZE];
        self.rng.fill(&mut nonce[..]);

        let challenge = Frame::init(BROADCAST_CID, CMD_INIT, INIT_NONCE_SIZE as u16, &nonce);
        self.transport.send_frame(&challenge)?;

        loop {
            let frame = self.transport.receive_frame(recv_timeout())?;
            let Frame::Init { cid, cmd, bcnt, data } = frame else {
                continue;
            };
            if cid != BROADCAST_CID
                || cmd != CMD_INIT
                || bcnt as usize != INIT_RESPONSE_SIZE
                || data[..INIT_NONCE_SIZE] != nonce
            {
                continue;
            }

            let allocated = u32::from_be_bytes([data[8], data[9], data[10], data[11]]);
            self.transport.set_cid(allocated);
            self.capabilities = Some(Capabilities::from_byte(data[16]));
            tracing::info!(cid = format!("{allocated:#010x}"), "channel established");
            return Ok(());
        }
    }

    /// CTAPHID_WINK: ask the key to identify itself visually. Optional for
    /// authenticators; the observed outcome is kept for the capability
    /// consistency report.
    pub fn wink(&mut self) -> Result<(), Status> {
        self.observed_wink = Some(false);

        self.transport.send_command(CMD_WINK, &[])?;
        let (cmd, data) = self.transport.receive_command(recv_timeout())?;
        if cmd != CMD_WINK {
            return Err(Status::InvalidCommand);
        }
        if !data.is_empty() {
            return Err(Status::InvalidLength);
        }

        self.observed_wink = Some(true);
        Ok(())
    }

    /// CTAPHID_PING: the key echoes the payload back. Returns the echo;
    /// the caller decides what a mismatch means.
    pub fn ping(&mut self, data: &[u8]) -> Result<Vec<u8>, Status> {
        self.transport.send_command(CMD_PING, data)?;
        let (cmd, echo) = self.transport.receive_command(recv_timeout())?;
        if cmd != CMD_PING {
            return Err(Status::InvalidCommand);
        }
        Ok(echo)
    }

    /// Send one CTAP2 command byte plus its CBOR-encoded request, drain
    /// keepalives while the key works or waits for a touch, and return the
    /// CBOR response body.
    ///
    /// `expect_up` states whether the operation should have required user
    /// presence; a mismatch with the observed prompt is reported as a
    /// diagnostic, not an error.
    ///
    /// Panics if the key answers with a status byte outside every
    /// documented range.
    pub fn exchange_cbor(
        &mut self,
        command: u8,
        payload: &[u8],
        expect_up: bool,
    ) -> Result<Vec<u8>, Status> {
        // The status byte shares the frame budget with the payload.
        if 1 + payload.len() > MAX_PAYLOAD_SIZE {
            return Err(Status::InvalidLength);
        }
        let mut request = Vec::with_capacity(1 + payload.len());
        request.push(command);
        request.extend_from_slice(payload);

        self.transport.send_command(CMD_CBOR, &request)?;

        let mut state = ExchangeState::AwaitingFirst;
        let (response, prompted) = loop {
            let (cmd, data) = self.transport.receive_command(recv_timeout())?;
            let (next, prompt_now) = state.advance(cmd, data);
            if prompt_now {
                diagnostics::prompt_user();
            }
            match next {
                ExchangeState::Complete { payload, prompted } => break (payload, prompted),
                ExchangeState::Failed(status) => return Err(status),
                next => state = next,
            }
        };

        if prompted && !expect_up {
            diagnostics::fail_message("A prompt was sent unexpectedly.");
        }
        if !prompted && expect_up {
            diagnostics::fail_message(
                "A prompt was expected, but not performed. Sometimes it is just not \
                 recognized if performed too fast.",
            );
        }

        match classify(response[0]) {
            StatusClass::Known(Status::Ok) => Ok(response[1..].to_vec()),
            StatusClass::Known(status) => Err(status),
            StatusClass::DeprecatedRemoved(byte) => {
                diagnostics::fail_message(&format!("Received deprecated error code 0x{byte:02x}"));
                Err(Status::Other)
            }
            StatusClass::ExtensionSpecific(byte) => {
                diagnostics::fail_message(&format!(
                    "Received extension specific error code 0x{byte:02x}"
                ));
                Err(Status::Other)
            }
            StatusClass::VendorSpecific(byte) => {
                diagnostics::fail_message(&format!(
                    "Received vendor specific error code 0x{byte:02x}"
                ));
                Err(Status::Other)
            }
            StatusClass::Unspecified(byte) => {
                panic!("the returned status byte is unspecified: 0x{byte:02x}")
            }
        }
    }
}

fn recv_timeout() -> Duration {
    Duration::from_millis(RECEIVE_TIMEOUT_MS)
}
