//! Human-readable formatting of byte counts and text.

use num_traits::Zero;

use crate::math::{kib_pow, Bytes};

const UNITS: [&str; 12] = [
    "B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB", "ZiB", "YiB", "RiB", "QiB", "SiB",
];

/// Format a byte count with a binary unit and one decimal, e.g. `1.5 KiB`.
///
/// Values beyond the largest unit keep growing in `SiB`.
#[must_use]
pub fn format_bytes(value: &Bytes) -> String {
    if value.is_zero() {
        return "0.0 B".to_string();
    }

    let mut unit = 0usize;
    let mut scaled = value.clone();
    while scaled >= Bytes::from(1024u32) && unit < UNITS.len() - 1 {
        scaled >>= 10;
        unit += 1;
    }

    let divisor = kib_pow(unit as u32);
    let tenths = (value * 10u32 + (&divisor >> 1)) / &divisor;
    let whole = &tenths / 10u32;
    let frac = &tenths % 10u32;
    format!("{whole}.{frac} {}", UNITS[unit])
}

/// Format a rate as `"<bytes>/s"`.
#[must_use]
pub fn format_rate(value: &Bytes) -> String {
    format!("{}/s", format_bytes(value))
}

/// Greedy word wrap.
///
/// Words longer than `width` are split across lines.
#[must_use]
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        loop {
            let current_len = current.chars().count();
            let needed = if current.is_empty() {
                word.len()
            } else {
                current_len + 1 + word.len()
            };
            if needed <= width {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.extend(word.iter());
                break;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                continue;
            }
            // Word alone is too wide.
            let rest = word.split_off(width);
            lines.push(word.iter().collect());
            word = rest;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
