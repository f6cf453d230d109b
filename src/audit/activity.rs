use std::path::Path;
use async_trait::async_trait;
use chrono::Local;
use serde::Serialize;
use crate::errors::FinderError;
use crate::models::ScanRequest;

/// Placeholder for absent entry fields.
const NOT_APPLICABLE: &str = "N/A";

/// One audit entry, written per client with exported results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityEntry {
    pub user: String,
    pub timestamp: String,
    pub base_dir: String,
    pub year: String,
    pub month: String,
    pub client_name: String,
    pub statement_type: String,
    pub output_file: String,
}

impl ActivityEntry {
    pub fn new(request: &ScanRequest, client: &str, output_file: &Path) -> Self {
        Self {
            user: acting_user(),
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            base_dir: request.base_dir.display().to_string(),
            year: request.year_label().to_string(),
            month: request.month_label().to_string(),
            client_name: or_not_applicable(client),
            statement_type: or_not_applicable(&request.types.join(",")),
            output_file: or_not_applicable(&output_file.display().to_string()),
        }
    }

    /// Multi-line block as appended to the activity log.
    pub fn render(&self) -> String {
        format!(
            "User: {}\nTimestamp: {}\nBase Directory: {}\nYear: {}\nMonth: {}\n\
             Client Name: {}\nStatement Type: {}\nOutput File: {}\n\n",
            self.user,
            self.timestamp,
            self.base_dir,
            self.year,
            self.month,
            self.client_name,
            self.statement_type,
            self.output_file,
        )
    }
}

/// Destination for activity entries. Passed explicitly into a run.
#[async_trait]
pub trait ActivitySink: Send + Sync {
    async fn record(&self, entry: &ActivityEntry) -> Result<(), FinderError>;
}

/// Discards every entry.
pub struct NoopActivityLog;

#[async_trait]
impl ActivitySink for NoopActivityLog {
    async fn record(&self, _entry: &ActivityEntry) -> Result<(), FinderError> {
        Ok(())
    }
}

fn acting_user() -> String {
    std::env::var("USERNAME")
        .or_else(|_| std::env::var("USER"))
        .ok()
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn or_not_applicable(value: &str) -> String {
    if value.is_empty() {
        NOT_APPLICABLE.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(types: &[&str]) -> ScanRequest {
        ScanRequest::new(
            "/data/Client Statements",
            Some("2024".into()),
            None,
            vec!["Jones".into()],
            types.iter().map(|s| s.to_string()).collect(),
            Some(1),
        )
    }

    #[test]
    fn test_entry_fields() {
        let entry = ActivityEntry::new(&request(&["K-1", "CC"]), "Jones", Path::new("/out/x.csv"));
        assert_eq!(entry.year, "2024");
        assert_eq!(entry.month, "all");
        assert_eq!(entry.client_name, "Jones");
        assert_eq!(entry.statement_type, "K-1,CC");
        assert_eq!(entry.output_file, "/out/x.csv");
        assert_eq!(entry.timestamp.len(), 19);
        assert!(!entry.user.is_empty());
    }

    #[test]
    fn test_missing_values_render_not_applicable() {
        let entry = ActivityEntry::new(&request(&[]), "", Path::new("/out/x.csv"));
        assert_eq!(entry.client_name, "N/A");
        assert_eq!(entry.statement_type, "N/A");
    }

    #[test]
    fn test_render_block_layout() {
        let entry = ActivityEntry::new(&request(&["STMT"]), "Jones", Path::new("/out/x.csv"));
        let block = entry.render();
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(lines.len(), 9);
        assert!(lines[0].starts_with("User: "));
        assert_eq!(lines[2], "Base Directory: /data/Client Statements");
        assert_eq!(lines[6], "Statement Type: STMT");
        assert_eq!(lines[7], "Output File: /out/x.csv");
        assert_eq!(lines[8], "");
    }
}
