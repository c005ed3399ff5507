//! Size arithmetic and formatting shared by the reporter and the optimizer.

use crate::constants::{ESTIMATE_DENOMINATOR, ESTIMATE_NUMERATOR};

/// Format a byte count with binary units.
///
/// Values under 1024 are printed as whole `Bytes`; anything larger uses the
/// smallest of KB, MB, GB whose value stays under 1024 (GB absorbs everything
/// above) with two decimals.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["Bytes", "KB", "MB", "GB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes < 1024 {
        return format!("{} {}", bytes, UNITS[0]);
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    // 1023.999 KB would otherwise print as "1024.00 KB"
    let mut rounded = (size * 100.0).round() / 100.0;
    if rounded >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
        rounded = (size * 100.0).round() / 100.0;
    }

    format!("{:.2} {}", rounded, UNITS[unit_index])
}

/// Percentage saved going from `original` to `new`. Negative when the new
/// size is larger; zero when there is nothing to compare against.
pub fn savings_percent(original: u64, new: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    ((original as f64 - new as f64) / original as f64) * 100.0
}

/// Heuristic WebP size for a file that has not been converted yet.
pub fn estimate_size(bytes: u64) -> u64 {
    bytes / ESTIMATE_DENOMINATOR * ESTIMATE_NUMERATOR
        + bytes % ESTIMATE_DENOMINATOR * ESTIMATE_NUMERATOR / ESTIMATE_DENOMINATOR
}

pub fn bytes_to_mib(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 Bytes");
        assert_eq!(format_bytes(512), "512 Bytes");
        assert_eq!(format_bytes(1023), "1023 Bytes");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1024 * 1024), "1.00 MB");
        assert_eq!(format_bytes(4 * 1024 * 1024), "4.00 MB");
        assert_eq!(format_bytes(1024 * 1024 * 1024), "1.00 GB");
        assert_eq!(format_bytes(5000 * 1024 * 1024 * 1024), "5000.00 GB");
    }

    #[test]
    fn test_format_bytes_rounding_carries_to_next_unit() {
        assert_eq!(format_bytes(1024 * 1024 - 1), "1.00 MB");
    }

    #[test]
    fn test_savings_percent() {
        assert_eq!(savings_percent(1000, 800), 20.0);
        assert_eq!(savings_percent(1000, 1200), -20.0);
        assert_eq!(savings_percent(1000, 1000), 0.0);
        assert_eq!(savings_percent(0, 500), 0.0);
    }

    #[test]
    fn test_estimate_size() {
        assert_eq!(estimate_size(0), 0);
        assert_eq!(estimate_size(10), 3);
        assert_eq!(estimate_size(1000), 300);
        // truncates like the original heuristic
        assert_eq!(estimate_size(7), 2);
        assert_eq!(estimate_size(u64::MAX), u64::MAX / 10 * 3 + 1);
    }

    #[test]
    fn test_bytes_to_mib() {
        assert_eq!(bytes_to_mib(1024 * 1024), 1.0);
        assert_eq!(bytes_to_mib(0), 0.0);
    }
}
