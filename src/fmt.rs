//! Formatting helpers for diagnostic display.
//!
//! Display functions print integers as hexadecimal with their decimal value,
//! four-character codes as text when they are printable, and binary blobs as
//! hex dumps.

/// Text form of a four-character code, when all four bytes are printable
/// ASCII.
///
/// # Examples
/// ```rust
/// use tsdesc::fmt::four_cc;
///
/// assert_eq!(four_cc(0x43554549).as_deref(), Some("CUEI"));
/// assert_eq!(four_cc(0x12345678), None);
/// ```
pub fn four_cc(value: u32) -> Option<String> {
    let bytes = value.to_be_bytes();
    bytes
        .iter()
        .all(|&b| b.is_ascii_graphic() || b == b' ')
        .then(|| bytes.iter().map(|&b| b as char).collect())
}

/// Formats an integer as `0x` hexadecimal followed by its decimal value,
/// e.g. `0x0100 (256)`. `digits` is the number of hex digits to show.
///
/// # Examples
/// ```rust
/// use tsdesc::fmt::format_hex_dec;
///
/// assert_eq!(format_hex_dec(0x1F, 2), "0x1F (31)");
/// assert_eq!(format_hex_dec(256, 4), "0x0100 (256)");
/// ```
pub fn format_hex_dec(value: u64, digits: usize) -> String {
    format!("0x{:0digits$X} ({})", value, value, digits = digits)
}

/// Multi-line hexadecimal dump, 16 bytes per line with an ASCII column.
///
/// Every line, including the last, ends with a newline and starts with
/// `margin`. An empty input gives an empty string.
pub fn hex_dump(data: &[u8], margin: &str) -> String {
    let mut out = String::new();
    for (index, chunk) in data.chunks(16).enumerate() {
        let hex: Vec<String> = chunk.iter().map(|b| format!("{:02X}", b)).collect();
        let ascii: String = chunk
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
            .collect();
        out.push_str(&format!(
            "{}{:04X}:  {:<47}  {}\n",
            margin,
            index * 16,
            hex.join(" "),
            ascii
        ));
    }
    out
}
