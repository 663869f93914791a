pub mod config;
pub mod ctaphid;
pub mod diagnostics;
pub mod error;
pub mod hid;

pub use ctaphid::{Capabilities, Session, Status};

/// authenticatorGetInfo, the one CTAP2 command every key must answer.
const CTAP2_GET_INFO: u8 = 0x04;

pub fn run(cfg: config::Config) -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;
    let level = match cfg.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .init();

    if cfg.list {
        hid::print_fido_devices()?;
        return Ok(());
    }

    let vid = parse_id(cfg.vendor_id.as_deref(), "--vendor-id")?;
    let pid = parse_id(cfg.product_id.as_deref(), "--product-id")?;
    probe(vid, pid)?;
    Ok(())
}

fn parse_id(arg: Option<&str>, flag: &str) -> anyhow::Result<u16> {
    let raw = arg.ok_or_else(|| anyhow::anyhow!("{flag} is required (or use --list)"))?;
    u16::from_str_radix(raw.trim_start_matches("0x"), 16)
        .map_err(|e| anyhow::anyhow!("invalid {flag}: {e}"))
}

/// Open the key, run the INIT handshake and exercise each declared
/// capability once, then print the consistency report.
fn probe(vid: u16, pid: u16) -> error::Result<()> {
    let mut locator = hid::HidApiLocator::new()?;
    let link = locator.connect(vid, pid)?;
    let mut session = Session::open_with_entropy(link);

    session.init()?;
    if let Some(caps) = session.capabilities() {
        tracing::info!(
            wink = caps.supports_wink,
            cbor = caps.supports_cbor,
            msg = caps.supports_msg,
            "capabilities"
        );
    }

    // WINK is optional; a refusal is part of the report, not a failure.
    match session.wink() {
        Ok(()) => tracing::info!("WINK acknowledged"),
        Err(status) => tracing::warn!("WINK failed: {status}"),
    }

    let pattern: Vec<u8> = (0u16..200).map(|i| i as u8).collect();
    let echo = session.ping(&pattern)?;
    if echo == pattern {
        tracing::info!(len = pattern.len(), "PING echoed");
    } else {
        diagnostics::fail_message("The PING payload did not round-trip.");
    }

    if session.capabilities().is_some_and(|caps| caps.supports_cbor) {
        match session.exchange_cbor(CTAP2_GET_INFO, &[], false) {
            Ok(info) => println!(
                "GetInfo response ({} bytes): {}",
                info.len(),
                diagnostics::hex_string(&info)
            ),
            Err(status) => tracing::warn!("GetInfo failed: {status}"),
        }
    }

    diagnostics::print_report(vid, pid, session.capabilities(), session.observed_wink());
    session.close();
    Ok(())
}
