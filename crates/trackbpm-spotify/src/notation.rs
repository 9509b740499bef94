// SPDX-License-Identifier: GPL-3.0-or-later

//! Translation of provider numeric codes into display notation.

const PITCH_CLASSES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Display value for a key the provider could not detect.
pub const UNKNOWN_KEY: &str = "N/A";

/// Format a pitch class (0..11) and mode (1 = major, otherwise minor) as e.g. `"G# major"`.
///
/// A pitch class of -1, or anything else outside 0..11, yields [`UNKNOWN_KEY`].
pub fn format_key(pitch_class: i32, mode: i32) -> String {
    let Some(note) = usize::try_from(pitch_class)
        .ok()
        .and_then(|idx| PITCH_CLASSES.get(idx))
    else {
        return UNKNOWN_KEY.to_string();
    };

    let scale = if mode == 1 { "major" } else { "minor" };
    format!("{} {}", note, scale)
}

/// Format a millisecond duration as `m:ss`. Partial seconds are dropped.
pub fn format_duration(duration_ms: u64) -> String {
    let total_seconds = duration_ms / 1000;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}
