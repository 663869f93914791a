//! The one-byte status taxonomy shared by CTAPHID ERROR frames and CTAP2
//! response status bytes.

/// Deprecated codes a conforming authenticator must no longer emit.
pub const STATUS_CBOR_PARSING_REMOVED: u8 = 0x10;
pub const STATUS_INVALID_CBOR_TYPE_REMOVED: u8 = 0x13;

const EXTENSION_FIRST: u8 = 0xE0;
const EXTENSION_LAST: u8 = 0xEF;
const VENDOR_FIRST: u8 = 0xF0;
const VENDOR_LAST: u8 = 0xF8;

/// Every status byte the specifications document. Transport failures reuse
/// the low codes (`Timeout`, `InvalidSeq`, ...) so one enum covers both the
/// wire taxonomy and this crate's own error reporting. `Ok` exists to make
/// the numbering total; it never appears inside an `Err`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[repr(u8)]
pub enum Status {
    #[error("success")]
    Ok = 0x00,
    #[error("invalid command")]
    InvalidCommand = 0x01,
    #[error("invalid parameter")]
    InvalidParameter = 0x02,
    #[error("invalid length")]
    InvalidLength = 0x03,
    #[error("invalid sequence number")]
    InvalidSeq = 0x04,
    #[error("timeout")]
    Timeout = 0x05,
    #[error("channel busy")]
    ChannelBusy = 0x06,
    #[error("lock required")]
    LockRequired = 0x0A,
    #[error("invalid channel")]
    InvalidChannel = 0x0B,
    #[error("unexpected CBOR type")]
    CborUnexpectedType = 0x11,
    #[error("invalid CBOR")]
    InvalidCbor = 0x12,
    #[error("missing parameter")]
    MissingParameter = 0x14,
    #[error("limit exceeded")]
    LimitExceeded = 0x15,
    #[error("unsupported extension")]
    UnsupportedExtension = 0x16,
    #[error("credential excluded")]
    CredentialExcluded = 0x19,
    #[error("processing")]
    Processing = 0x21,
    #[error("invalid credential")]
    InvalidCredential = 0x22,
    #[error("user action pending")]
    UserActionPending = 0x23,
    #[error("operation pending")]
    OperationPending = 0x24,
    #[error("no operations")]
    NoOperations = 0x25,
    #[error("unsupported algorithm")]
    UnsupportedAlgorithm = 0x26,
    #[error("operation denied")]
    OperationDenied = 0x27,
    #[error("key store full")]
    KeyStoreFull = 0x28,
    #[error("no operation pending")]
    NoOperationPending = 0x2A,
    #[error("unsupported option")]
    UnsupportedOption = 0x2B,
    #[error("invalid option")]
    InvalidOption = 0x2C,
    #[error("keepalive cancel")]
    KeepaliveCancel = 0x2D,
    #[error("no credentials")]
    NoCredentials = 0x2E,
    #[error("user action timeout")]
    UserActionTimeout = 0x2F,
    #[error("not allowed")]
    NotAllowed = 0x30,
    #[error("PIN invalid")]
    PinInvalid = 0x31,
    #[error("PIN blocked")]
    PinBlocked = 0x32,
    #[error("PIN auth invalid")]
    PinAuthInvalid = 0x33,
    #[error("PIN auth blocked")]
    PinAuthBlocked = 0x34,
    #[error("PIN not set")]
    PinNotSet = 0x35,
    #[error("PIN required")]
    PinRequired = 0x36,
    #[error("PIN policy violation")]
    PinPolicyViolation = 0x37,
    #[error("PIN token expired")]
    PinTokenExpired = 0x38,
    #[error("request too large")]
    RequestTooLarge = 0x39,
    #[error("action timeout")]
    ActionTimeout = 0x3A,
    #[error("user presence required")]
    UpRequired = 0x3B,
    #[error("user verification blocked")]
    UvBlocked = 0x3C,
    #[error("unspecified error")]
    Other = 0x7F,
}

impl Status {
    pub fn byte(self) -> u8 {
        self as u8
    }

    pub fn from_byte(byte: u8) -> Option<Status> {
        let status = match byte {
            0x00 => Status::Ok,
            0x01 => Status::InvalidCommand,
            0x02 => Status::InvalidParameter,
            0x03 => Status::InvalidLength,
            0x04 => Status::InvalidSeq,
            0x05 => Status::Timeout,
            0x06 => Status::ChannelBusy,
            0x0A => Status::LockRequired,
            0x0B => Status::InvalidChannel,
            0x11 => Status::CborUnexpectedType,
            0x12 => Status::InvalidCbor,
            0x14 => Status::MissingParameter,
            0x15 => Status::LimitExceeded,
            0x16 => Status::UnsupportedExtension,
            0x19 => Status::CredentialExcluded,
            0x21 => Status::Processing,
            0x22 => Status::InvalidCredential,
            0x23 => Status::UserActionPending,
            0x24 => Status::OperationPending,
            0x25 => Status::NoOperations,
            0x26 => Status::UnsupportedAlgorithm,
            0x27 => Status::OperationDenied,
            0x28 => Status::KeyStoreFull,
            0x2A => Status::NoOperationPending,
            0x2B => Status::UnsupportedOption,
            0x2C => Status::InvalidOption,
            0x2D => Status::KeepaliveCancel,
            0x2E => Status::NoCredentials,
            0x2F => Status::UserActionTimeout,
            0x30 => Status::NotAllowed,
            0x31 => Status::PinInvalid,
            0x32 => Status::PinBlocked,
            0x33 => Status::PinAuthInvalid,
            0x34 => Status::PinAuthBlocked,
            0x35 => Status::PinNotSet,
            0x36 => Status::PinRequired,
            0x37 => Status::PinPolicyViolation,
            0x38 => Status::PinTokenExpired,
            0x39 => Status::RequestTooLarge,
            0x3A => Status::ActionTimeout,
            0x3B => Status::UpRequired,
            0x3C => Status::UvBlocked,
            0x7F => Status::Other,
            _ => return None,
        };
        Some(status)
    }

    /// Typed view of a status byte reported inside an ERROR frame. Bytes
    /// outside the enumerated set collapse to `Other`; the original value
    /// is still logged.
    pub fn from_wire(byte: u8) -> Status {
        match classify(byte) {
            StatusClass::Known(status) => status,
            class => {
                tracing::warn!("device reported unmapped status byte {:#04x}", class.byte());
                Status::Other
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Known(Status),
    DeprecatedRemoved(u8),
    ExtensionSpecific(u8),
    VendorSpecific(u8),
    Unspecified(u8),
}

impl StatusClass {
    pub fn byte(&self) -> u8 {
        match *self {
            StatusClass::Known(status) => status.byte(),
            StatusClass::DeprecatedRemoved(byte)
            | StatusClass::ExtensionSpecific(byte)
            | StatusClass::VendorSpecific(byte)
            | StatusClass::Unspecified(byte) => byte,
        }
    }
}

/// Total classification of a device-reported status byte. The deprecated
/// codes are checked first: 0x13 would otherwise read as part of the
/// known CTAP2 block.
pub fn classify(byte: u8) -> StatusClass {
    match byte {
        STATUS_CBOR_PARSING_REMOVED | STATUS_INVALID_CBOR_TYPE_REMOVED => {
            StatusClass::DeprecatedRemoved(byte)
        }
        EXTENSION_FIRST..=EXTENSION_LAST => StatusClass::ExtensionSpecific(byte),
        VENDOR_FIRST..=VENDOR_LAST => StatusClass::VendorSpecific(byte),
        _ => match Status::from_byte(byte) {
            Some(status) => StatusClass::Known(status),
            None => StatusClass::Unspecified(byte),
        },
    }
}

/// Keepalive payload byte, sent while the authenticator works or waits
/// for a touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepaliveStatus {
    Processing,
    UpNeeded,
    Error,
}

impl KeepaliveStatus {
    /// A keepalive payload is exactly one byte; anything else is an error.
    pub fn parse(payload: &[u8]) -> KeepaliveStatus {
        if payload.len() != 1 {
            return KeepaliveStatus::Error;
        }
        match payload[0] {
            1 => {
                tracing::debug!("keepalive: key is still processing");
                KeepaliveStatus::Processing
            }
            2 => {
                tracing::debug!("keepalive: user interaction is needed");
                KeepaliveStatus::UpNeeded
            }
            _ => KeepaliveStatus::Error,
        }
    }
}
