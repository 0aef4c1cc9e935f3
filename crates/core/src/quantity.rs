//! Kubernetes resource quantity helpers.

use once_cell::sync::Lazy;
use regex::Regex;

static MEMORY_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)\s*([A-Za-z]*)$").ok());

static QUANTITY_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^([+-]?(?:\d+(?:\.\d*)?|\.\d+))(?:([eE][+-]?\d+)|([A-Za-z]*))$").ok());

const MIB: f64 = 1024.0 * 1024.0;

/// Convert a memory quantity string (`128Mi`, `1.5Gi`, `500000000`) to whole
/// MiB, truncating toward zero. Decimal suffixes are treated like their
/// binary counterparts (`M` == `Mi`). Anything unparseable yields 0.
pub fn parse_memory_to_mib(s: &str) -> i64 {
    let Some(re) = MEMORY_RE.as_ref() else { return 0 };
    let Some(caps) = re.captures(s.trim()) else { return 0 };
    let Ok(value) = caps[1].parse::<f64>() else { return 0 };
    let mib = match &caps[2] {
        "" => value / MIB,
        "k" | "Ki" => value / 1024.0,
        "M" | "Mi" => value,
        "G" | "Gi" => value * 1024.0,
        "T" | "Ti" => value * 1024.0 * 1024.0,
        _ => return 0,
    };
    mib as i64
}

/// Parse an exact Kubernetes quantity into base units (cores or bytes).
pub fn parse_quantity(s: &str) -> Option<f64> {
    let re = QUANTITY_RE.as_ref()?;
    let caps = re.captures(s.trim())?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    if let Some(exp) = caps.get(2) {
        let e: i32 = exp.as_str()[1..].parse().ok()?;
        return Some(value * 10f64.powi(e));
    }
    let (mul, div) = match caps.get(3).map(|m| m.as_str()).unwrap_or("") {
        "n" => (1.0, 1e9),
        "u" => (1.0, 1e6),
        "m" => (1.0, 1e3),
        "" => (1.0, 1.0),
        "k" => (1e3, 1.0),
        "M" => (1e6, 1.0),
        "G" => (1e9, 1.0),
        "T" => (1e12, 1.0),
        "P" => (1e15, 1.0),
        "E" => (1e18, 1.0),
        "Ki" => (1024.0, 1.0),
        "Mi" => (MIB, 1.0),
        "Gi" => (MIB * 1024.0, 1.0),
        "Ti" => (MIB * MIB, 1.0),
        "Pi" => (MIB * MIB * 1024.0, 1.0),
        "Ei" => (MIB * MIB * MIB, 1.0),
        _ => return None,
    };
    Some(value * mul / div)
}

/// CPU usage rendered as whole millicores, rounded up (`250m`).
pub fn format_cpu(cores: f64) -> String {
    format!("{}m", (cores * 1000.0 - 1e-9).ceil().max(0.0) as i64)
}

/// Memory usage rendered as `{n}Mi` from 1 MiB upwards, raw bytes below.
pub fn format_memory(bytes: f64) -> String {
    let bytes = bytes.ceil().max(0.0) as i64;
    if bytes >= 1024 * 1024 { format!("{}Mi", bytes / (1024 * 1024)) } else { bytes.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_to_mib_table() {
        let cases = [
            ("", 0),
            ("128Mi", 128),
            ("1Gi", 1024),
            ("2Gi", 2048),
            ("512Mi", 512),
            ("1024Mi", 1024),
            ("500000000", 476),
            ("1000Mi", 1000),
            ("1.5Gi", 1536),
            ("invalid", 0),
            ("123", 0),
            ("1000000k", 976),
            ("256M", 256),
            ("1Ti", 1_048_576),
            ("  64Mi ", 64),
            ("64 Mi", 64),
            ("5Xi", 0),
            ("-1Gi", 0),
        ];
        for (input, want) in cases {
            assert_eq!(parse_memory_to_mib(input), want, "input {input:?}");
        }
    }

    #[test]
    fn exact_quantities() {
        assert_eq!(parse_quantity("250m"), Some(0.25));
        assert_eq!(parse_quantity("2"), Some(2.0));
        assert_eq!(parse_quantity("1Ki"), Some(1024.0));
        assert_eq!(parse_quantity("128974848"), Some(128_974_848.0));
        assert_eq!(parse_quantity("1e3"), Some(1000.0));
        assert_eq!(parse_quantity("1E"), Some(1e18));
        assert!((parse_quantity("123456789n").unwrap() - 0.123456789).abs() < 1e-12);
        assert_eq!(parse_quantity("abc"), None);
        assert_eq!(parse_quantity("1Zi"), None);
    }

    #[test]
    fn usage_formatting() {
        assert_eq!(format_cpu(0.25), "250m");
        assert_eq!(format_cpu(0.000_123_456), "1m");
        assert_eq!(format_cpu(0.0), "0m");
        assert_eq!(format_cpu(2.0), "2000m");
        assert_eq!(format_memory(128.0 * 1024.0 * 1024.0), "128Mi");
        assert_eq!(format_memory(1_572_864.0 + 10.0), "1Mi");
        assert_eq!(format_memory(4096.0), "4096");
    }
}
