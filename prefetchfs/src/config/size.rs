//! Human-readable size parsing for host front-ends (e.g. "4GB", "512MB").

use std::fmt;

use thiserror::Error;

/// Error parsing a size string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid size '{input}' - expected a byte count like '4GB', '512MB' or '1024'")]
pub struct SizeParseError {
    input: String,
}

const UNITS: [(&str, usize); 6] = [
    ("GB", 1024 * 1024 * 1024),
    ("G", 1024 * 1024 * 1024),
    ("MB", 1024 * 1024),
    ("M", 1024 * 1024),
    ("KB", 1024),
    ("K", 1024),
];

/// Parse a human-readable size string into bytes.
///
/// Accepts bare byte counts and K/KB, M/MB, G/GB suffixes,
/// case-insensitive and whitespace tolerant.
///
/// # Examples
///
/// ```
/// use prefetchfs::config::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1 KB").unwrap(), 1024);
/// assert_eq!(parse_size("4gb").unwrap(), 4 * 1024 * 1024 * 1024);
/// ```
pub fn parse_size(input: &str) -> Result<usize, SizeParseError> {
    let err = || SizeParseError {
        input: input.to_string(),
    };

    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(err());
    }

    let upper = trimmed.to_uppercase();
    let (digits, multiplier) = UNITS
        .iter()
        .find_map(|(suffix, multiplier)| {
            upper
                .strip_suffix(suffix)
                .map(|digits| (digits.trim_end(), *multiplier))
        })
        .unwrap_or((upper.as_str(), 1));

    let count: usize = digits.parse().map_err(|_| err())?;
    count.checked_mul(multiplier).ok_or_else(err)
}

/// Format a byte count with the largest unit that divides it evenly.
///
/// # Examples
///
/// ```
/// use prefetchfs::config::format_size;
///
/// assert_eq!(format_size(4 * 1024 * 1024 * 1024), "4GB");
/// assert_eq!(format_size(1536), "1536");
/// ```
pub fn format_size(bytes: usize) -> String {
    const GB: usize = 1024 * 1024 * 1024;
    const MB: usize = 1024 * 1024;
    const KB: usize = 1024;

    if bytes >= GB && bytes % GB == 0 {
        format!("{}GB", bytes / GB)
    } else if bytes >= MB && bytes % MB == 0 {
        format!("{}MB", bytes / MB)
    } else if bytes >= KB && bytes % KB == 0 {
        format!("{}KB", bytes / KB)
    } else {
        format!("{bytes}")
    }
}

/// Format a byte count as fractional megabytes for status output.
pub fn format_mb(bytes: usize) -> impl fmt::Display {
    struct Mb(f64);
    impl fmt::Display for Mb {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{:.2} MB", self.0)
        }
    }
    Mb(bytes as f64 / (1024.0 * 1024.0))
}
