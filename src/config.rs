/// Budget for receiving one complete multi-frame response.
pub const RECEIVE_TIMEOUT_MS: u64 = 5000;
/// A key may re-enumerate after a reset; keep looking for a while.
pub const DEVICE_RETRIES: u32 = 10;
pub const DEVICE_RETRY_STEP_MS: u64 = 100;

#[derive(clap::Parser, Debug, Clone)]
pub struct Config {
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
    /// USB vendor ID of the security key, e.g. 0x1050.
    #[arg(long)]
    pub vendor_id: Option<String>,
    /// USB product ID of the security key, e.g. 0x0407.
    #[arg(long)]
    pub product_id: Option<String>,
    /// List FIDO HID devices and exit.
    #[arg(long)]
    pub list: bool,
}
