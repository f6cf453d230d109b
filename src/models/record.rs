use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Client label used for records found by the unassigned bucket.
pub const UNASSIGNED_CLIENT: &str = "unassigned";

/// CSV header written ahead of every manifest.
pub const CSV_HEADER: [&str; 7] = [
    "Manager",
    "Year",
    "Month",
    "File Name",
    "Client",
    "File Path",
    "Modified Date",
];

/// One statement file that satisfied the client and type filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementRecord {
    /// Manager directory the file was found under.
    pub manager: String,
    /// Name of the directory two levels above the file.
    pub year: String,
    /// Name of the directory directly containing the file.
    pub month: String,
    pub file_name: String,
    /// Client the scan task was scheduled for, or `unassigned`.
    pub client: String,
    pub path: PathBuf,
    /// Last-modified time as `YYYY-MM-DD HH:MM:SS` (local time).
    pub modified: String,
}

impl StatementRecord {
    /// The record as a manifest row, in `CSV_HEADER` column order.
    pub fn to_row(&self) -> [String; 7] {
        [
            self.manager.clone(),
            self.year.clone(),
            self.month.clone(),
            self.file_name.clone(),
            self.client.clone(),
            self.path.to_string_lossy().into_owned(),
            self.modified.clone(),
        ]
    }
}

/// Client label stored on a record for a task's client filter.
pub fn client_label(client: &str) -> String {
    if client.is_empty() {
        UNASSIGNED_CLIENT.to_string()
    } else {
        client.to_string()
    }
}
