//! Fuzz target: scan output extraction
//!
//! Feeds arbitrary text through all three scan parsers and checks that
//! every entry they yield is internally consistent.
//!
//! cargo fuzz run fuzz_scan_parser

#![no_main]

use libfuzzer_sys::fuzz_target;
use roamd::adapters::parse;
use roamd::adapters::utils::MacFinder;
use roamd::app::discovery::merge_passes;
use roamd::app::ports::ScanReport;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(macs) = MacFinder::new() else {
        return;
    };

    let mut report = ScanReport::default();
    report.push(parse::BSS_BLOCKS, parse::parse_bss_blocks(text));
    report.push(parse::LINE_FALLBACK, parse::parse_line_fallback(text, &macs));
    report.push(parse::SCAN_RESULTS_TABLE, parse::parse_scan_results(text));

    // Each parser only emits entries it could attach to a BSSID.
    for pass in &report.passes {
        assert!(pass.entries.iter().all(|e| e.bssid.is_some()), "{}", pass.strategy);
    }

    let merged = merge_passes(&report);
    assert!(merged.len() <= report.total_entries());
});
