//! Fuzz target for FID text parsing
//!
//! Any string must either fail cleanly or produce a FID whose canonical
//! form parses back to the same value.

#![no_main]

use libfuzzer_sys::fuzz_target;
use lustre_fs::Fid;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(fid) = text.parse::<Fid>() {
        let canonical = fid.to_string();
        let reparsed: Fid = canonical
            .parse()
            .expect("canonical FID form must parse");
        assert_eq!(fid, reparsed);
        assert_eq!(fid.is_dot_lustre(), reparsed.is_dot_lustre());
    }
});
