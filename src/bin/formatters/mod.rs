// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Output formatters for shell/script results.

use crate::commands::{Entry, Output};
use reedart::TreeStats;
use serde_json::json;

/// Formats a command output in the requested format.
pub fn format_output(output: &Output, format: &str) -> String {
    match output {
        Output::Message(m) => {
            if m.is_empty() {
                String::new()
            } else {
                format!("{}\n", m)
            }
        }
        Output::Entries(entries) => match format {
            "json" => format_entries_json(entries),
            "csv" => format_entries_csv(entries),
            _ => format_entries_table(entries),
        },
        Output::Stats(stats) => match format {
            "json" => format_stats_json(stats),
            _ => format_stats_table(stats),
        },
        Output::Dump(text) => text.clone(),
        Output::Exit => String::new(),
    }
}

/// Formats entries as a human-readable table.
fn format_entries_table(entries: &[Entry]) -> String {
    if entries.is_empty() {
        return "0 entries\n".to_string();
    }
    let key_width = entries.iter().map(|e| e.key.len()).max().unwrap_or(3).max(3);
    let value_width = entries
        .iter()
        .map(|e| e.value.len())
        .max()
        .unwrap_or(5)
        .max(5);

    let mut output = String::new();
    let border = format!(
        "+{}+{}+\n",
        "-".repeat(key_width + 2),
        "-".repeat(value_width + 2)
    );
    output.push_str(&border);
    output.push_str(&format!(
        "| {:<key_width$} | {:<value_width$} |\n",
        "key", "value"
    ));
    output.push_str(&border);
    for entry in entries {
        output.push_str(&format!(
            "| {:<key_width$} | {:<value_width$} |\n",
            entry.key, entry.value
        ));
    }
    output.push_str(&border);
    output.push_str(&format!(
        "{} entr{}\n",
        entries.len(),
        if entries.len() == 1 { "y" } else { "ies" }
    ));
    output
}

/// Formats entries as a JSON array.
fn format_entries_json(entries: &[Entry]) -> String {
    let values: Vec<_> = entries
        .iter()
        .map(|e| json!({ "key": e.key, "value": e.value }))
        .collect();
    format!("{}\n", serde_json::Value::Array(values))
}

/// Formats entries as pipe-separated CSV with a header row.
fn format_entries_csv(entries: &[Entry]) -> String {
    let mut output = String::from("key|value\n");
    for entry in entries {
        output.push_str(&format!("{}|{}\n", entry.key, entry.value));
    }
    output
}

/// Formats tree stats as a two-column table.
fn format_stats_table(stats: &TreeStats) -> String {
    let rows = [
        ("entries", stats.leaf_count),
        ("node4", stats.node4_count),
        ("node16", stats.node16_count),
        ("node48", stats.node48_count),
        ("node256", stats.node256_count),
        ("grows", stats.grow_count),
        ("shrinks", stats.shrink_count),
        ("prefix splits", stats.prefix_split_count),
        ("resident bytes", stats.resident_bytes),
    ];
    let mut output = String::new();
    for (name, value) in rows {
        output.push_str(&format!("{:<16} {}\n", name, value));
    }
    output
}

/// Formats tree stats as one JSON object.
fn format_stats_json(stats: &TreeStats) -> String {
    match serde_json::to_string(stats) {
        Ok(s) => format!("{}\n", s),
        Err(e) => format!("Error: {}\n", e),
    }
}

#[cfg(test)]
mod formatters_test {
    use super::*;

    fn sample() -> Vec<Entry> {
        vec![
            Entry {
                key: "1".to_string(),
                value: "V1".to_string(),
            },
            Entry {
                key: "10".to_string(),
                value: "V10".to_string(),
            },
        ]
    }

    #[test]
    fn test_table_format_lists_all_entries() {
        let text = format_entries_table(&sample());
        assert!(text.contains("| 1 "));
        assert!(text.contains("| V10"));
        assert!(text.contains("2 entries"));
    }

    #[test]
    fn test_csv_format() {
        let text = format_entries_csv(&sample());
        assert_eq!(text, "key|value\n1|V1\n10|V10\n");
    }

    #[test]
    fn test_json_format_round_trips() {
        let text = format_entries_json(&sample());
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed[1]["key"], "10");
        assert_eq!(parsed[1]["value"], "V10");
    }

    #[test]
    fn test_empty_entries() {
        assert_eq!(format_entries_table(&[]), "0 entries\n");
    }
}
