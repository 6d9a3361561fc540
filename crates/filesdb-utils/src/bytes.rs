/// Formats a number of bytes into a human-readable string.
///
/// Converts a byte count into a string with binary units (B, KiB, MiB, ...) and a
/// specified number of decimal places.
///
/// # Example
///
/// ```
/// use filesdb_utils::bytes::format_bytes;
///
/// assert_eq!(format_bytes(1024_u64.pow(2), 2), "1.00 MiB");
/// ```
pub fn format_bytes(bytes: u64, precision: usize) -> String {
    let unit = 1024.0;
    let sizes = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];

    if bytes == 0 {
        return format!("{:.*} {}", precision, 0.0, sizes[0]);
    }

    let idx = (bytes as f64).log(unit).floor() as usize;
    let idx = idx.min(sizes.len() - 1);

    format!(
        "{:.*} {}",
        precision,
        bytes as f64 / unit.powi(idx as i32),
        sizes[idx]
    )
}

/// Percentage of `current` over `total`, or `None` when the total is unknown.
pub fn percentage(current: u64, total: u64) -> Option<f64> {
    (total > 0).then(|| 100.0 * (current as f64 / total as f64))
}
