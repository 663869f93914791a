use super::status::{KeepaliveStatus, Status};
use super::types::{CMD_CBOR, CMD_KEEPALIVE};

/// Progress of one CBOR exchange, advanced once per received command.
/// Keepalives loop in `Draining`; the CBOR answer terminates in `Complete`;
/// everything else is a protocol violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeState {
    AwaitingFirst,
    Draining { prompted: bool },
    Complete { payload: Vec<u8>, prompted: bool },
    Failed(Status),
}

impl ExchangeState {
    /// Feed the next received command. The second value is true when this
    /// transition fires the user-presence prompt; across a whole exchange
    /// it is true at most once.
    pub fn advance(self, cmd: u8, data: Vec<u8>) -> (ExchangeState, bool) {
        let prompted = matches!(self, ExchangeState::Draining { prompted: true });
        match self {
            ExchangeState::Complete { .. } | ExchangeState::Failed(_) => (self, false),
            ExchangeState::AwaitingFirst | ExchangeState::Draining { .. } => match cmd {
                CMD_KEEPALIVE => match KeepaliveStatus::parse(&data) {
                    KeepaliveStatus::Processing => (ExchangeState::Draining { prompted }, false),
                    KeepaliveStatus::UpNeeded => {
                        (ExchangeState::Draining { prompted: true }, !prompted)
                    }
                    KeepaliveStatus::Error => (ExchangeState::Failed(Status::Other), false),
                },
                CMD_CBOR => {
                    if data.is_empty() {
                        (ExchangeState::Failed(Status::InvalidLength), false)
                    } else {
                        (ExchangeState::Complete { payload: data, prompted }, false)
                    }
                }
                _ => (ExchangeState::Failed(Status::InvalidCommand), false),
            },
        }
    }
}
