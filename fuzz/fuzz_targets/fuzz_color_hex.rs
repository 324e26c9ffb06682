//! Fuzz target for color hex parsing.
//!
//! Rgba::from_hex must return None for anything it cannot parse, never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use text_overlay::Rgba;

fuzz_target!(|data: &str| {
    let _ = Rgba::from_hex(data);

    if !data.starts_with('#') {
        let _ = Rgba::from_hex(&format!("#{data}"));
    }

    // Every suffix and prefix on a char boundary.
    for (i, _) in data.char_indices().take(10) {
        let _ = Rgba::from_hex(&data[i..]);
        let _ = Rgba::from_hex(&data[..i]);
    }

    // A parsed color prints back to something that parses to the same color.
    if let Some(color) = Rgba::from_hex(data) {
        assert_eq!(Rgba::from_hex(&color.to_string()), Some(color));
    }
});
