//! Filename predicates deciding whether a file belongs to a client and
//! statement type. Only the file name is inspected, never the path.

use regex::Regex;
use crate::errors::FinderError;

/// Case-insensitive substring match of `client` in `filename`.
/// An empty client matches every file.
pub fn matches_client(filename: &str, client: &str) -> bool {
    if client.is_empty() {
        return true;
    }
    filename.to_lowercase().contains(&client.to_lowercase())
}

/// Precompiled statement type tokens.
///
/// A token matches when it appears case-insensitively and is neither
/// preceded nor followed by an ASCII letter, so `K-1` matches
/// `report_K-1.pdf` and `K-1_2024.pdf` but `CC` does not match `ACCT.pdf`.
#[derive(Debug, Clone)]
pub struct TypeFilter {
    pattern: Option<Regex>,
}

impl TypeFilter {
    pub fn new(tokens: &[String]) -> Result<Self, FinderError> {
        let tokens: Vec<String> = tokens
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if tokens.is_empty() {
            return Ok(Self { pattern: None });
        }

        let alternation = tokens
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");
        // Boundary classes stay outside the case-insensitive group so they
        // remain strictly ASCII letters.
        let pattern = Regex::new(&format!(
            r"(?:^|[^A-Za-z])(?i:{alternation})(?:$|[^A-Za-z])"
        ))?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    pub fn matches(&self, filename: &str) -> bool {
        match &self.pattern {
            Some(pattern) => pattern.is_match(filename),
            None => true,
        }
    }

}

/// True when any token in `tokens` appears in `filename` as a whole token.
/// An empty token list matches every file.
pub fn matches_types(filename: &str, tokens: &[String]) -> bool {
    match TypeFilter::new(tokens) {
        Ok(filter) => filter.matches(filename),
        Err(_) => false,
    }
}
