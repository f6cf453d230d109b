pub fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else if ms < 3_600_000 {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    } else {
        let hours = ms / 3_600_000;
        let mins = (ms % 3_600_000) / 60_000;
        format!("{}h {}m", hours, mins)
    }
}

/// `1 file`, `3 files`.
pub fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

/// Display name of a client bucket; the empty name is the unassigned bucket.
pub fn client_display(client: &str) -> &str {
    if client.is_empty() {
        "(unassigned)"
    } else {
        client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(250), "250ms");
        assert_eq!(format_duration(1500), "1.5s");
        assert_eq!(format_duration(125_000), "2m 5s");
        assert_eq!(format_duration(3_720_000), "1h 2m");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize(1, "file", "files"), "1 file");
        assert_eq!(pluralize(0, "file", "files"), "0 files");
    }

    #[test]
    fn test_client_display() {
        assert_eq!(client_display(""), "(unassigned)");
        assert_eq!(client_display("Jones"), "Jones");
    }
}
