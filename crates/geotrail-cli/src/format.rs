//! Output formatting for run reports and inventories.

use std::fmt::Write as _;

use anyhow::Result;
use owo_colors::OwoColorize;

use geotrail_core::{DatabaseReport, DatabaseStatus, Inventory, RunReport, TableOutcome};

/// Formatting options for output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    /// Disable colored output.
    pub no_color: bool,
    /// Use compact JSON output (no pretty-printing).
    pub compact: bool,
}

impl FormatOptions {
    pub fn new(no_color: bool) -> Self {
        Self {
            no_color,
            compact: false,
        }
    }

    /// Create with compact JSON option.
    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    /// Serialize value to JSON string, respecting compact option.
    pub fn as_json<T: serde::Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.compact {
            serde_json::to_string(value)?
        } else {
            serde_json::to_string_pretty(value)?
        };
        Ok(json + "\n")
    }

    fn ok(&self, s: &str) -> String {
        if self.no_color {
            s.to_string()
        } else {
            s.green().to_string()
        }
    }

    fn warn(&self, s: &str) -> String {
        if self.no_color {
            s.to_string()
        } else {
            s.yellow().to_string()
        }
    }

    fn bold(&self, s: &str) -> String {
        if self.no_color {
            s.to_string()
        } else {
            s.bold().to_string()
        }
    }
}

/// Format an archive inventory as text.
#[must_use]
pub fn format_inventory_text(inventory: &Inventory, opts: &FormatOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({} entries)",
        opts.bold(&inventory.archive.display().to_string()),
        inventory.entry_count
    );
    for db in &inventory.databases {
        let status = if db.present {
            opts.ok("present")
        } else {
            opts.warn("not found")
        };
        let _ = writeln!(out, "  {:<16} {:<10} {}", db.name, status, db.entry_path);
    }
    out
}

/// Format a run report as text.
#[must_use]
pub fn format_report_text(report: &RunReport, opts: &FormatOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", opts.bold(&report.archive.display().to_string()));

    for db in &report.databases {
        format_database(&mut out, db, opts);
    }

    let outputs: Vec<_> = report.outputs().collect();
    if outputs.is_empty() {
        let _ = writeln!(out, "\nNo files written.");
    } else {
        let _ = writeln!(out, "\nFiles written:");
        for path in outputs {
            let _ = writeln!(out, "  {}", path.display());
        }
    }
    out
}

fn format_database(out: &mut String, db: &DatabaseReport, opts: &FormatOptions) {
    match db.status {
        DatabaseStatus::Missing => {
            let _ = writeln!(out, "  {}: {}", db.name, opts.warn("not found"));
            return;
        }
        DatabaseStatus::Processed => {
            let _ = writeln!(out, "  {}: {}", db.name, opts.ok("extracted"));
        }
    }

    for table in &db.tables {
        let line = match &table.outcome {
            TableOutcome::Missing => opts.warn("table not located, skipped"),
            TableOutcome::SchemaMismatch { reason } => {
                opts.warn(&format!("unexpected layout, skipped ({reason})"))
            }
            TableOutcome::Extracted { rows, rejected: 0 } => format!("{rows} rows"),
            TableOutcome::Extracted { rows, rejected } => {
                format!("{rows} rows, {}", opts.warn(&format!("{rejected} rejected")))
            }
        };
        let _ = writeln!(out, "    {:<16} {}", table.table, line);
    }

    if let Some(tables) = &db.survey {
        let list = if tables.is_empty() {
            "(none)".to_string()
        } else {
            tables.join(", ")
        };
        let _ = writeln!(out, "    tables: {list}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use geotrail_core::{EntryStatus, TableReport};

    fn plain() -> FormatOptions {
        FormatOptions::new(true)
    }

    fn report() -> RunReport {
        RunReport {
            archive: PathBuf::from("image.zip"),
            databases: vec![
                DatabaseReport {
                    name: "routined cache".into(),
                    entry_path: "/a/Cache.sqlite".into(),
                    status: DatabaseStatus::Processed,
                    tables: vec![
                        TableReport {
                            table: "ZRTCLLOCATIONMO".into(),
                            outcome: TableOutcome::Extracted {
                                rows: 10,
                                rejected: 2,
                            },
                        },
                        TableReport {
                            table: "ZRTVISITMO".into(),
                            outcome: TableOutcome::Missing,
                        },
                    ],
                    survey: None,
                    outputs: vec![PathBuf::from("trackLog.csv"), PathBuf::from("routined.kml")],
                },
                DatabaseReport {
                    name: "local cache".into(),
                    entry_path: "/a/Local.sqlite".into(),
                    status: DatabaseStatus::Missing,
                    tables: Vec::new(),
                    survey: None,
                    outputs: Vec::new(),
                },
            ],
        }
    }

    #[test]
    fn test_report_text() {
        let text = format_report_text(&report(), &plain());
        assert!(text.contains("routined cache: extracted"));
        assert!(text.contains("10 rows, 2 rejected"));
        assert!(text.contains("table not located, skipped"));
        assert!(text.contains("local cache: not found"));
        assert!(text.contains("  trackLog.csv"));
    }

    #[test]
    fn test_report_json_is_parseable() {
        let json = plain().as_json(&report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["databases"][1]["status"], "missing");
        assert_eq!(
            value["databases"][0]["tables"][1]["outcome"]["status"],
            "missing"
        );
    }

    #[test]
    fn test_inventory_text() {
        let inventory = Inventory {
            archive: PathBuf::from("image.zip"),
            entry_count: 3,
            databases: vec![EntryStatus {
                name: "local cache".into(),
                entry_path: "/a/Local.sqlite".into(),
                present: false,
            }],
        };
        let text = format_inventory_text(&inventory, &plain());
        assert!(text.starts_with("image.zip (3 entries)"));
        assert!(text.contains("not found"));
    }

    #[test]
    fn test_compact_json_is_one_line() {
        let json = plain().with_compact(true).as_json(&report()).unwrap();
        assert_eq!(json.lines().count(), 1);
    }
}
