use std::ffi::{CStr, CString};
use std::thread;
use std::time::Duration;

use hidapi::{HidApi, HidDevice};

use super::{DeviceLocator, HidError, HidLink};
use crate::config::{DEVICE_RETRIES, DEVICE_RETRY_STEP_MS};

/// HID usage page assigned to the FIDO alliance.
pub const FIDO_USAGE_PAGE: u16 = 0xF1D0;

/// `HidLink` over a hidraw device opened through hidapi.
pub struct HidApiLink {
    device: Option<HidDevice>,
}

impl HidApiLink {
    pub fn open(api: &HidApi, path: &CStr) -> Result<Self, HidError> {
        let device = api
            .open_path(path)
            .map_err(|e| HidError::Open(e.to_string()))?;
        Ok(Self { device: Some(device) })
    }
}

impl HidLink for HidApiLink {
    fn write(&mut self, buf: &[u8]) -> Result<usize, HidError> {
        let Some(device) = &self.device else {
            return Err(HidError::Write("device is closed".into()));
        };
        device.write(buf).map_err(|e| HidError::Write(e.to_string()))
    }

    fn read(&mut self, buf: &mut [u8], timeout_ms: u64) -> Result<usize, HidError> {
        let Some(device) = &self.device else {
            return Err(HidError::Read("device is closed".into()));
        };
        device
            .read_timeout(buf, timeout_ms as i32)
            .map_err(|e| HidError::Read(e.to_string()))
    }

    fn close(&mut self) {
        self.device = None;
    }
}

pub struct HidApiLocator {
    api: HidApi,
}

impl HidApiLocator {
    pub fn new() -> Result<Self, HidError> {
        let api = HidApi::new().map_err(|e| HidError::Open(e.to_string()))?;
        Ok(Self { api })
    }

    /// Resolve and open in one step.
    pub fn connect(&mut self, vid: u16, pid: u16) -> Result<HidApiLink, HidError> {
        let path = self
            .resolve(vid, pid)
            .ok_or(HidError::NotFound { vid, pid })?;
        tracing::info!(path = path.to_string_lossy().into_owned(), "opening security key");
        HidApiLink::open(&self.api, &path)
    }
}

impl DeviceLocator for HidApiLocator {
    fn resolve(&mut self, vid: u16, pid: u16) -> Option<CString> {
        for attempt in 0..DEVICE_RETRIES {
            // Iteration index as multiplier: no wait before the first attempt.
            thread::sleep(Duration::from_millis(DEVICE_RETRY_STEP_MS * attempt as u64));
            if let Err(e) = self.api.refresh_devices() {
                tracing::debug!("HID enumeration failed: {e}");
                continue;
            }
            let found = self.api.device_list().find(|info| {
                info.vendor_id() == vid
                    && info.product_id() == pid
                    && info.usage_page() == FIDO_USAGE_PAGE
            });
            if let Some(info) = found {
                return Some(info.path().to_owned());
            }
        }
        None
    }
}

/// List every HID interface on the FIDO usage page.
pub fn print_fido_devices() -> Result<(), HidError> {
    let api = HidApi::new().map_err(|e| HidError::Open(e.to_string()))?;
    for info in api.device_list().filter(|d| d.usage_page() == FIDO_USAGE_PAGE) {
        println!("Found device");
        println!("  VID/PID     : {:04x}:{:04x}", info.vendor_id(), info.product_id());
        println!("  Page/Usage  : {:#06x}/{:#06x}", info.usage_page(), info.usage());
        println!("  Manufacturer: {}", info.manufacturer_string().unwrap_or("(unknown)"));
        println!("  Product     : {}", info.product_string().unwrap_or("(unknown)"));
        println!("  S/N         : {}", info.serial_number().unwrap_or("(unknown)"));
        println!("  Path        : {}", info.path().to_string_lossy());
        println!();
    }
    Ok(())
}
