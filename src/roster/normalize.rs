//! Market-value string normalization.
//!
//! Roster pages list values like `€1.50m`, `€750k` or `-`. Everything is
//! converted to millions of euros.

const CURRENCY: char = '€';
const MILLIONS: &str = "m";
// Billions are stripped but not scaled; `€1.2bn` reads as 1.2 million.
const BILLIONS: &str = "bn";
const THOUSANDS: &str = "k";

/// Convert a raw value string to millions, or `None` when the magnitude is
/// unknown or the number does not parse. Never panics.
pub fn normalize(raw: &str) -> Option<f64> {
    let stripped = raw.trim().replace(CURRENCY, "");

    if stripped.contains(MILLIONS) || stripped.contains(BILLIONS) {
        let number = stripped.replace(BILLIONS, "").replace(MILLIONS, "");
        return parse_number(&number);
    }

    if stripped.contains(THOUSANDS) {
        let number = stripped.replace(THOUSANDS, "");
        return parse_number(&number).map(|v| v / 1000.0);
    }

    None
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millions() {
        assert_eq!(normalize("€1.5m"), Some(1.5));
        assert_eq!(normalize("€2m"), Some(2.0));
        assert_eq!(normalize("  €80.00m "), Some(80.0));
    }

    #[test]
    fn test_thousands() {
        assert_eq!(normalize("€750k"), Some(0.75));
        assert_eq!(normalize("€500k"), Some(0.5));
    }

    #[test]
    fn test_billions_are_read_as_millions() {
        assert_eq!(normalize("€1.2bn"), Some(1.2));
    }

    #[test]
    fn test_unknown_magnitude() {
        assert_eq!(normalize("-"), None);
        assert_eq!(normalize(""), None);
        assert_eq!(normalize("€1500"), None);
        assert_eq!(normalize("no value listed"), None);
    }

    #[test]
    fn test_markers_are_case_sensitive() {
        assert_eq!(normalize("€1.5M"), None);
        assert_eq!(normalize("€750K"), None);
    }

    #[test]
    fn test_malformed_prefix() {
        assert_eq!(normalize("€abcm"), None);
        assert_eq!(normalize("€1.2.3k"), None);
        assert_eq!(normalize("Unknown"), None);
        assert_eq!(normalize("€infm"), None);
        assert_eq!(normalize("€NaNk"), None);
    }

    #[test]
    fn test_total_over_arbitrary_input() {
        let inputs = [
            "€", "m", "k", "bn", "€€€", "🙂m", "\u{0}k", "1e400m", "-1m", "€ 3 m", "m€k",
        ];
        for input in inputs {
            if let Some(v) = normalize(input) {
                assert!(v.is_finite(), "{input} produced {v}");
            }
        }
        assert_eq!(normalize("-1m"), Some(-1.0));
        assert_eq!(normalize("1e400m"), None);
    }
}
