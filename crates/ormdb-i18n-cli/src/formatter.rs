//! Output formatters.

use clap::ValueEnum;
use comfy_table::{Cell, Table};
use ormdb_model::{Instance, Row};
use serde::Serialize;

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// A table as listed by the `tables` command.
#[derive(Debug, Clone, Serialize)]
pub struct TableInfo {
    pub name: String,
    /// Base model for translation tables.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translates: Option<String>,
    pub columns: Vec<ColumnInfo>,
}

/// A column of a listed table.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    pub stored: bool,
}

/// Trait for formatting output.
pub trait Formatter: Send + Sync {
    /// Format loaded records. `columns` fixes the column order.
    fn format_instances(&self, columns: &[String], instances: &[Instance]) -> String;

    /// Format one record with its translation rows.
    fn format_instance(&self, columns: &[String], instance: &Instance, translations: &[Row])
        -> String;

    /// Format the table listing.
    fn format_tables(&self, tables: &[TableInfo]) -> String;

    /// Format a simple message.
    fn format_message(&self, message: &str) -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_instances(&self, columns: &[String], instances: &[Instance]) -> String {
        if instances.is_empty() {
            return "No results".to_string();
        }

        let mut table = Table::new();
        table.set_header(columns.iter().map(Cell::new));
        for instance in instances {
            table.add_row(columns.iter().map(|c| cell(instance.values(), c)));
        }
        format!("{}\n({} rows)", table, instances.len())
    }

    fn format_instance(
        &self,
        columns: &[String],
        instance: &Instance,
        translations: &[Row],
    ) -> String {
        let mut record = Table::new();
        record.set_header(vec!["Field", "Value"]);
        for column in columns {
            record.add_row(vec![Cell::new(column), cell(instance.values(), column)]);
        }

        if translations.is_empty() {
            return record.to_string();
        }

        let mut headers: Vec<String> = Vec::new();
        for row in translations {
            for field in row.fields() {
                if !headers.iter().any(|h| h == field) {
                    headers.push(field.to_string());
                }
            }
        }
        let mut table = Table::new();
        table.set_header(headers.iter().map(Cell::new));
        for row in translations {
            table.add_row(headers.iter().map(|h| cell(row, h)));
        }

        format!("{}\n\nTranslations:\n{}", record, table)
    }

    fn format_tables(&self, tables: &[TableInfo]) -> String {
        let mut table = Table::new();
        table.set_header(vec!["Table", "Translates", "Columns"]);

        for info in tables {
            let columns = info
                .columns
                .iter()
                .map(|c| {
                    if c.stored {
                        format!("{}: {}", c.name, c.column_type)
                    } else {
                        format!("{}: {} (virtual)", c.name, c.column_type)
                    }
                })
                .collect::<Vec<_>>()
                .join("\n");
            table.add_row(vec![
                Cell::new(&info.name),
                Cell::new(info.translates.as_deref().unwrap_or("")),
                Cell::new(columns),
            ]);
        }

        table.to_string()
    }

    fn format_message(&self, message: &str) -> String {
        message.to_string()
    }
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_instances(&self, _columns: &[String], instances: &[Instance]) -> String {
        serde_json::to_string_pretty(instances).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_instance(
        &self,
        _columns: &[String],
        instance: &Instance,
        _translations: &[Row],
    ) -> String {
        serde_json::to_string_pretty(instance).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_tables(&self, tables: &[TableInfo]) -> String {
        serde_json::to_string_pretty(tables).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_message(&self, message: &str) -> String {
        serde_json::json!({ "message": message }).to_string()
    }
}

fn cell(row: &Row, field: &str) -> Cell {
    match row.get(field) {
        Some(value) => Cell::new(value.to_string()),
        None => Cell::new(""),
    }
}
