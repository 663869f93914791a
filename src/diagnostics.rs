use crate::ctaphid::session::Capabilities;

/// Ask the operator to complete the user-presence check.
pub fn prompt_user() {
    println!("Please touch your security key!");
}

/// Non-fatal protocol finding, in red so it stands out between probe lines.
pub fn fail_message(message: &str) {
    eprintln!("\x1b[0;31m{message}\x1b[0m");
}

pub fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

/// Summary of what the key declared versus what the probe observed.
pub fn print_report(
    vid: u16,
    pid: u16,
    capabilities: Option<&Capabilities>,
    observed_wink: Option<bool>,
) {
    println!(" Vendor ID: 0x{vid:04x}");
    println!("Product ID: 0x{pid:04x}");

    let Some(caps) = capabilities else {
        return;
    };
    if let Some(worked) = observed_wink {
        if worked {
            println!("The optional command WINK worked.");
        } else {
            println!("The optional command WINK did not work.");
        }
        if worked != caps.supports_wink {
            fail_message("The reported WINK capability did NOT match the observed response.");
        }
    }
    if caps.supports_cbor {
        println!("The CBOR capability was set.");
    } else {
        println!("The CBOR capability was NOT set.");
    }
    if caps.supports_msg {
        println!("The MSG capability was set.");
    } else {
        println!("The MSG capability was NOT set.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_string() {
        assert_eq!(hex_string(&[]), "");
        assert_eq!(hex_string(&[0x00, 0xDE, 0xAD, 0x0F]), "00dead0f");
    }
}
