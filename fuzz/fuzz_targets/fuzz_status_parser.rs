//! Fuzz target: supplicant and link query replies
//!
//! `wpa_cli status`, `signal_poll`, `list_networks`, `iw link`,
//! `iwconfig` and the `ip` address/route readers must accept any text
//! without panicking.
//!
//! cargo fuzz run fuzz_status_parser

#![no_main]

use libfuzzer_sys::fuzz_target;
use roamd::adapters::parse;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);

    let status = parse::parse_status(&text);
    // A rendered BSSID always parses back to itself.
    if let Some(bssid) = status.bssid {
        assert_eq!(roamd::domain::Bssid::parse(&bssid.to_string()).ok(), Some(bssid));
    }
    let _ = parse::parse_signal_poll(&text);
    let _ = parse::parse_list_networks(&text);
    let _ = parse::parse_iw_link(&text);
    let _ = parse::parse_iwconfig(&text);
    let _ = parse::parse_ipv4_address(&text);
    let _ = parse::parse_default_gateway(&text);
});
