//! Table output formatting

use tabled::{
    Table, Tabled,
    builder::Builder,
    settings::{Alignment, Modify, Style, object::Rows},
};

/// Format data as a table
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    if data.is_empty() {
        return "No results found.".to_string();
    }

    let mut table = Table::new(data);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    table.to_string()
}

/// Format label/value pairs as a two-column table without a header.
pub fn format_pairs<K: AsRef<str>, V: AsRef<str>>(pairs: &[(K, V)]) -> String {
    let mut builder = Builder::default();
    for (key, value) in pairs {
        builder.push_record([key.as_ref().to_string(), value.as_ref().to_string()]);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Tabled)]
    struct StintRow {
        #[tabled(rename = "DRIVER")]
        driver: String,
        #[tabled(rename = "LAPS")]
        laps: String,
    }

    #[test]
    fn test_format_table_empty() {
        let items: Vec<StintRow> = vec![];
        assert_eq!(format_table(&items), "No results found.");
    }

    #[test]
    fn test_format_table_rows_and_header() {
        let items = vec![
            StintRow {
                driver: "VER".to_string(),
                laps: "1-11".to_string(),
            },
            StintRow {
                driver: "LEC".to_string(),
                laps: "1-8".to_string(),
            },
        ];

        let result = format_table(&items);

        assert!(result.contains("DRIVER"));
        assert!(result.contains("LAPS"));
        assert!(result.contains("VER"));
        assert!(result.contains("1-8"));
        // Rounded style uses ╭ for top-left corner
        assert!(result.contains("╭"));
        assert!(result.contains("╰"));
    }

    #[test]
    fn test_format_pairs() {
        let result = format_pairs(&[("Winner", "VER"), ("Total laps", "57")]);

        assert!(result.contains("Winner"));
        assert!(result.contains("VER"));
        assert!(result.contains("57"));
        assert!(result.contains("╭"));
    }
}
