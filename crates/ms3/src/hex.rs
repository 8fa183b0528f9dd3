//! Hex-string helpers for capture files and command-line payloads.
//!
//! The core crate deals only in bytes; hex stays at the harness layer.

/// Parse a hex string into bytes. Whitespace (spaces, newlines) between
/// digit pairs is ignored; an odd digit count or a non-hex character is an
/// error described by position.
pub fn parse_hex(input: &str) -> Result<Vec<u8>, String> {
    let mut digits = Vec::with_capacity(input.len());
    for (pos, ch) in input.char_indices() {
        if ch.is_ascii_whitespace() {
            continue;
        }
        let value = ch
            .to_digit(16)
            .ok_or_else(|| format!("invalid hex character {ch:?} at offset {pos}"))?;
        digits.push(value as u8);
    }
    if digits.len() % 2 != 0 {
        return Err(format!("odd number of hex digits ({})", digits.len()));
    }
    Ok(digits
        .chunks_exact(2)
        .map(|pair| (pair[0] << 4) | pair[1])
        .collect())
}

/// Format bytes as an uppercase hex string.
pub fn format_hex(data: &[u8]) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(data.len() * 2);
    for byte in data {
        let _ = write!(out, "{byte:02X}");
    }
    out
}
