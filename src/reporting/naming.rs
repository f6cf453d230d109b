/// Types segment used when no statement type tokens were requested.
pub const ALL_TYPES: &str = "AllTypes";

/// Keep only alphanumerics, spaces, underscores and hyphens, then trim
/// trailing whitespace.
pub fn sanitize_filename(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// `{year}_{month}_statements_{client}_{types}` without extension.
pub fn export_file_stem(year: &str, month: &str, client: &str, types: &[String]) -> String {
    let types = if types.is_empty() {
        ALL_TYPES.to_string()
    } else {
        types.join("_")
    };
    format!(
        "{}_{}_statements_{}_{}",
        year,
        month,
        sanitize_filename(client),
        sanitize_filename(&types)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_punctuation() {
        assert_eq!(sanitize_filename("O'Brien & Co."), "OBrien  Co");
        assert_eq!(sanitize_filename("K-1_CC"), "K-1_CC");
        assert_eq!(sanitize_filename("a/b\\c:d"), "abcd");
    }

    #[test]
    fn test_sanitize_trims_trailing_whitespace_only() {
        assert_eq!(sanitize_filename(" Jones  "), " Jones");
        assert_eq!(sanitize_filename("Jones ."), "Jones");
    }

    #[test]
    fn test_stem_with_filters() {
        let stem = export_file_stem("2024", "03-March", "report", &["K-1".to_string()]);
        assert_eq!(stem, "2024_03-March_statements_report_K-1");
    }

    #[test]
    fn test_stem_without_types_or_client() {
        let stem = export_file_stem("all", "all", "", &[]);
        assert_eq!(stem, "all_all_statements__AllTypes");
    }

    #[test]
    fn test_stem_joins_multiple_types() {
        let types = vec!["K-1".to_string(), "CC".to_string(), "ST/MT".to_string()];
        let stem = export_file_stem("2024", "all", "Jones", &types);
        assert_eq!(stem, "2024_all_statements_Jones_K-1_CC_STMT");
    }
}
