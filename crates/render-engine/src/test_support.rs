//! Font lookup shared by unit and integration tests.
//!
//! Integration tests pull this file in with `#[path]`, so it only uses std.

use std::path::PathBuf;

const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// `CLIPFRAME_TEST_FONT`, else the first well-known system font present.
pub fn system_font_path() -> Option<PathBuf> {
    let found = std::env::var_os("CLIPFRAME_TEST_FONT")
        .map(PathBuf::from)
        .into_iter()
        .chain(FONT_CANDIDATES.iter().map(PathBuf::from))
        .find(|p| p.is_file());
    if found.is_none() {
        eprintln!("skipping: no test font (set CLIPFRAME_TEST_FONT)");
    }
    found
}
