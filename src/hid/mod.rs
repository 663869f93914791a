use std::ffi::CString;

pub mod device;

pub use device::{HidApiLink, HidApiLocator, print_fido_devices};

#[derive(Debug, thiserror::Error)]
pub enum HidError {
    #[error("Failed to open HID device: {0}")]
    Open(String),
    #[error("HID read error: {0}")]
    Read(String),
    #[error("HID write error: {0}")]
    Write(String),
    #[error("No FIDO device with ID {vid:04x}:{pid:04x}")]
    NotFound { vid: u16, pid: u16 },
}

/// Byte pipe to one HID device. A `write` sends a single report; `read`
/// returns the report length, or 0 when the timeout expires first.
pub trait HidLink {
    fn write(&mut self, buf: &[u8]) -> Result<usize, HidError>;
    fn read(&mut self, buf: &mut [u8], timeout_ms: u64) -> Result<usize, HidError>;
    fn close(&mut self);
}

/// Maps a vendor/product ID pair to an openable HID path.
pub trait DeviceLocator {
    fn resolve(&mut self, vid: u16, pid: u16) -> Option<CString>;
}
