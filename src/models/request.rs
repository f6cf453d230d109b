use std::path::PathBuf;

/// Upper bound on the scan worker pool.
pub const MAX_WORKERS: usize = 64;

/// Parameters of one run. Built once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub base_dir: PathBuf,
    pub year: Option<String>,
    pub month: Option<String>,
    /// Client filters in request order. `""` is the unassigned bucket.
    pub clients: Vec<String>,
    /// Statement type tokens. Empty matches every file.
    pub types: Vec<String>,
    pub workers: usize,
}

impl ScanRequest {
    pub fn new(
        base_dir: impl Into<PathBuf>,
        year: Option<String>,
        month: Option<String>,
        clients: Vec<String>,
        types: Vec<String>,
        workers: Option<usize>,
    ) -> Self {
        Self {
            base_dir: base_dir.into(),
            year: non_empty(year),
            month: non_empty(month),
            clients: normalize_clients(clients),
            types: types
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            workers: resolve_workers(workers),
        }
    }

    /// Year filter for file names and logs; `all` when unset.
    pub fn year_label(&self) -> &str {
        self.year.as_deref().unwrap_or("all")
    }

    pub fn month_label(&self) -> &str {
        self.month.as_deref().unwrap_or("all")
    }
}

/// Split a comma separated CLI value into trimmed, non-empty items.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn normalize_clients(clients: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(clients.len().max(1));
    for client in clients {
        let client = client.trim().to_string();
        if !out.contains(&client) {
            out.push(client);
        }
    }
    if out.is_empty() {
        out.push(String::new());
    }
    out
}

fn resolve_workers(workers: Option<usize>) -> usize {
    match workers {
        Some(n) => n.clamp(1, MAX_WORKERS),
        None => std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(4)
            .min(MAX_WORKERS),
    }
}

/// One manager directory paired with one client filter.
#[derive(Debug, Clone)]
pub struct ScanTask {
    pub id: usize,
    pub manager: String,
    pub manager_dir: PathBuf,
    pub client: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_clients_become_unassigned_bucket() {
        let req = ScanRequest::new("/data", None, None, vec![], vec![], Some(2));
        assert_eq!(req.clients, vec![String::new()]);
    }

    #[test]
    fn test_duplicate_clients_collapse_in_order() {
        let req = ScanRequest::new(
            "/data",
            None,
            None,
            vec!["Jones".into(), " Smith ".into(), "Jones".into()],
            vec![],
            Some(2),
        );
        assert_eq!(req.clients, vec!["Jones".to_string(), "Smith".to_string()]);
    }

    #[test]
    fn test_blank_filters_are_unset() {
        let req = ScanRequest::new(
            "/data",
            Some("  ".into()),
            Some(String::new()),
            vec!["a".into()],
            vec!["K-1".into(), " ".into()],
            Some(1),
        );
        assert!(req.year.is_none());
        assert!(req.month.is_none());
        assert_eq!(req.year_label(), "all");
        assert_eq!(req.month_label(), "all");
        assert_eq!(req.types, vec!["K-1".to_string()]);
    }

    #[test]
    fn test_workers_clamped() {
        assert_eq!(ScanRequest::new("/d", None, None, vec![], vec![], Some(0)).workers, 1);
        assert_eq!(
            ScanRequest::new("/d", None, None, vec![], vec![], Some(1000)).workers,
            MAX_WORKERS
        );
        assert!(ScanRequest::new("/d", None, None, vec![], vec![], None).workers >= 1);
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("K-1, CC,,STMT "), vec!["K-1", "CC", "STMT"]);
        assert!(split_list("").is_empty());
    }
}
