/// Distance range used when the image server cannot be asked.
pub const DEFAULT_DISTANCE_RANGE: (f64, f64) = (-1000.0, 1000.0);

/// Parses a `Wlz-distance-range` response body of the form
/// `"<label>:<min> <max>"`.
pub fn parse_distance_range(body: &str) -> Option<(f64, f64)> {
    let (_, values) = body.split_once(':')?;
    let mut fields = values.split_whitespace();
    let min = fields.next()?.parse::<f64>().ok()?;
    let max = fields.next()?.parse::<f64>().ok()?;
    Some((min, max))
}

#[cfg(test)]
mod tests {
    use super::parse_distance_range;

    #[test]
    fn parses_label_min_max() {
        assert_eq!(
            parse_distance_range("Wlz-distance-range:-245 310\n"),
            Some((-245.0, 310.0))
        );
        assert_eq!(parse_distance_range("r: 0 12.5"), Some((0.0, 12.5)));
    }

    #[test]
    fn malformed_bodies_are_none() {
        assert_eq!(parse_distance_range("no colon"), None);
        assert_eq!(parse_distance_range("r:12"), None);
        assert_eq!(parse_distance_range("r:a b"), None);
    }
}
