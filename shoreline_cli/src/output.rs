//! Rendering helpers shared by the views.

/// format a byte count to a human readable string
pub fn format_bytes(bytes: u64) -> String {
    let mut bytes = bytes as f64;
    let mut suffix = "B";
    if bytes > 1024.0 {
        bytes /= 1024.0;
        suffix = "KB";
    }
    if bytes > 1024.0 {
        bytes /= 1024.0;
        suffix = "MB";
    }
    if bytes > 1024.0 {
        bytes /= 1024.0;
        suffix = "GB";
    }
    if bytes > 1024.0 {
        bytes /= 1024.0;
        suffix = "TB";
    }
    format!("{:.2} {}", bytes, suffix)
}

/// Clip a cell value to the column width.
pub fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Render a backend timestamp for table display. Timestamps the client
/// cannot parse are shown as sent.
pub fn format_date(date: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(date) {
        Ok(parsed) => parsed.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => date.to_string(),
    }
}

/// Sort key for a backend timestamp; unparseable dates sort together.
pub fn date_key(date: &str) -> i64 {
    chrono::DateTime::parse_from_rfc3339(date)
        .map(|d| d.timestamp())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0.00 B");
        assert_eq!(format_bytes(512), "512.00 B");
        assert_eq!(format_bytes(2048), "2.00 KB");
        assert_eq!(format_bytes(15_728_640), "15.00 MB");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 20), "short");
        assert_eq!(truncate("a-rather-long-file-name.pdf", 10), "a-rather-l");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(
            format_date("2024-01-15T10:30:00Z"),
            "2024-01-15 10:30".to_string()
        );
        assert_eq!(format_date("yesterday"), "yesterday".to_string());
    }
}
