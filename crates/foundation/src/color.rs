//! Colours are carried around as six lower-case hex digits (`"ff00aa"`),
//! the same form used by configuration files and share URLs.

/// Lower-cases `s` and drops every character that is not a hex digit.
///
/// `"#FF00aa"` becomes `"ff00aa"`, `"ghijkl"` becomes `""`.
pub fn sanitize_hex(s: &str) -> String {
    s.chars()
        .map(|c| c.to_ascii_lowercase())
        .filter(|c| c.is_ascii_hexdigit())
        .collect()
}

/// True for exactly six hex digits.
pub fn is_hex6(s: &str) -> bool {
    s.len() == 6 && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Formats an RGB triple as a zero-padded six digit hex colour.
pub fn hex_from_rgb(rgb: [u8; 3]) -> String {
    format!("{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

/// Integer value of the leading hex digits of `s`.
///
/// Mirrors the lenient parse used when colours are handed to the renderer:
/// trailing garbage is ignored and an empty prefix yields 0 (black).
pub fn hex_to_u32(s: &str) -> u32 {
    let s = s.trim();
    let digits: String = s
        .strip_prefix("0x")
        .unwrap_or(s)
        .chars()
        .take_while(|c| c.is_ascii_hexdigit())
        .take(8)
        .collect();
    u32::from_str_radix(&digits, 16).unwrap_or(0)
}

/// `"r,g,b,a"` component string for a packed `0xRRGGBB` colour.
pub fn rgba_components(color: u32, alpha: u8) -> String {
    let r = (color >> 16) & 255;
    let g = (color >> 8) & 255;
    let b = color & 255;
    format!("{r},{g},{b},{alpha}")
}
