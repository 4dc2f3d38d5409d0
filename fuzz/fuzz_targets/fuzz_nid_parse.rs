//! Fuzz target for LNet NID parsing
//!
//! Exercises driver dispatch and the tcp parser with arbitrary input.

#![no_main]

use libfuzzer_sys::fuzz_target;
use lustre_lnet::{Nid, TcpNid, parse_nid};

fuzz_target!(|data: &[u8]| {
    // NIDs are short; long inputs only slow the fuzzer down
    if data.len() > 256 {
        return;
    }
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(nid) = parse_nid(text) {
        assert_eq!(nid.driver(), "tcp");
        let reparsed: TcpNid = nid
            .to_string()
            .parse()
            .expect("displayed NID must parse");
        assert_eq!(reparsed.address(), nid.address());
        assert_eq!(reparsed.lnet(), nid.lnet());
    }
});
