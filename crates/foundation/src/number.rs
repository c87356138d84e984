/// Formats a number the way a browser's default number-to-string
/// conversion does for the values the viewer produces: integral values
/// carry no fractional part and negative zero prints as `0`.
pub fn format_number(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if v == 0.0 {
        return "0".to_string();
    }
    format!("{v}")
}

/// Rounds to six decimal places, halves going towards positive infinity.
pub fn round6(v: f64) -> f64 {
    let r = (v * 1_000_000.0 + 0.5).floor() / 1_000_000.0;
    if r == 0.0 { 0.0 } else { r }
}

/// Six decimal place rounding followed by [`format_number`], the float
/// format used in share URLs.
pub fn sensible_float_str(v: f64) -> String {
    format_number(round6(v))
}

fn skip_ascii_digits(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|b| !b.is_ascii_digit())
        .map_or(bytes.len(), |n| from + n)
}

/// Reads the longest leading decimal literal of `s`, ignoring leading
/// whitespace and whatever follows the number. `None` when there is no
/// numeric prefix at all.
pub fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    if s[end..].starts_with("Infinity") {
        return Some(if bytes[0] == b'-' {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_end = skip_ascii_digits(bytes, end);
    let mut mantissa_end = int_end;
    let mut has_digits = int_end > end;
    if bytes.get(int_end) == Some(&b'.') {
        let frac_end = skip_ascii_digits(bytes, int_end + 1);
        if frac_end > int_end + 1 || has_digits {
            mantissa_end = frac_end;
            has_digits |= frac_end > int_end + 1;
        }
    }
    if !has_digits {
        return None;
    }

    end = mantissa_end;
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = skip_ascii_digits(bytes, exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    s[..end].parse().ok()
}

/// Reads the leading integer of `s` (decimal, or hexadecimal after `0x`),
/// ignoring leading whitespace and any trailing text such as a fraction.
pub fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let (radix, digits) = match rest.get(..2) {
        Some("0x" | "0X") => (16, &rest[2..]),
        _ => (10, rest),
    };
    let len = digits
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(digits.len());
    let value = i64::from_str_radix(&digits[..len], radix).ok()?;
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_values_have_no_fraction() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(-1000.0), "-1000");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn sensible_float_rounds_to_six_places() {
        assert_eq!(sensible_float_str(0.1234567), "0.123457");
        assert_eq!(sensible_float_str(2.5), "2.5");
        assert_eq!(sensible_float_str(1e-9), "0");
        assert_eq!(sensible_float_str(-0.0000004), "0");
    }

    #[test]
    fn halves_round_towards_positive_infinity() {
        assert_eq!(sensible_float_str(-0.0000005), "0");
        assert_eq!(sensible_float_str(0.0000005), "0.000001");
        assert_eq!(sensible_float_str(-0.0000025), "-0.000002");
    }

    #[test]
    fn float_prefix_ignores_trailing_text() {
        assert_eq!(parse_float_prefix("0#frag"), Some(0.0));
        assert_eq!(parse_float_prefix(" 12.5abc"), Some(12.5));
        assert_eq!(parse_float_prefix("-.5"), Some(-0.5));
        assert_eq!(parse_float_prefix("3."), Some(3.0));
        assert_eq!(parse_float_prefix("1e3x"), Some(1000.0));
        assert_eq!(parse_float_prefix("2e"), Some(2.0));
        assert_eq!(parse_float_prefix("-Infinity"), Some(f64::NEG_INFINITY));
    }

    #[test]
    fn float_prefix_needs_a_digit() {
        assert_eq!(parse_float_prefix(""), None);
        assert_eq!(parse_float_prefix("zero"), None);
        assert_eq!(parse_float_prefix("."), None);
        assert_eq!(parse_float_prefix("-"), None);
        assert_eq!(parse_float_prefix("#1"), None);
    }

    #[test]
    fn int_prefix_truncates() {
        assert_eq!(parse_int_prefix("1.0"), Some(1));
        assert_eq!(parse_int_prefix("01"), Some(1));
        assert_eq!(parse_int_prefix(" -3px"), Some(-3));
        assert_eq!(parse_int_prefix("0x1f"), Some(31));
        assert_eq!(parse_int_prefix("x"), None);
        assert_eq!(parse_int_prefix(""), None);
        assert_eq!(parse_int_prefix("-"), None);
    }
}
