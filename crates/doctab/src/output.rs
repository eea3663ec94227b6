//! Record serialization for the shell: CSV files and terminal tables.
//! The library returns in-memory records only; turning them into bytes on
//! disk (or glyphs on screen) happens here.

use outline::{Record, Variant};
use prettytable::{Cell, Row, Table};

use crate::prelude::new_table;

/// Byte-order mark written at the start of CSV output so spreadsheet tools
/// detect UTF-8 and render CJK content correctly.
const UTF8_BOM: &str = "\u{FEFF}";

const MAX_TABLE_CONTENT: usize = 80;

fn headers(variant: Variant) -> &'static [&'static str] {
    match variant {
        Variant::SingleLevel => &["title", "content"],
        Variant::Multilevel => &["level1", "level2", "level3", "content"],
    }
}

fn fields(record: &Record) -> Vec<&str> {
    match record {
        Record::Flat { title, content } => vec![title, content],
        Record::Nested {
            level1,
            level2,
            level3,
            content,
        } => vec![level1, level2, level3, content],
    }
}

/// Render records as CSV with a UTF-8 BOM and a header row.
pub fn to_csv(records: &[Record], variant: Variant) -> String {
    let mut out = String::from(UTF8_BOM);
    out.push_str(&csv_row(headers(variant)));
    for record in records {
        out.push_str(&csv_row(&fields(record)));
    }
    out
}

fn csv_row<S: AsRef<str>>(fields: &[S]) -> String {
    let mut row = fields
        .iter()
        .map(|f| csv_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    row.push_str("\r\n");
    row
}

/// Quote a field when it contains a delimiter, quote, or line break;
/// embedded quotes double.
fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render records as a terminal table, with content shortened to a preview.
pub fn render_table(records: &[Record], variant: Variant) -> Table {
    let mut table = new_table();
    table.set_titles(Row::new(
        headers(variant).iter().map(|h| Cell::new(h)).collect(),
    ));

    for record in records {
        let mut cells: Vec<Cell> = Vec::new();
        let fields = fields(record);
        let (content, titles) = fields.split_last().unwrap_or((&"", &[]));
        for title in titles {
            cells.push(Cell::new(title));
        }
        cells.push(Cell::new(&preview(content, MAX_TABLE_CONTENT)));
        table.add_row(Row::new(cells));
    }

    table
}

/// Shorten to approximately `max_chars` characters on a word boundary.
fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let cut: String = flat.chars().take(max_chars).collect();
    match cut.rfind(' ') {
        Some(idx) => format!("{}...", &cut[..idx]),
        None => format!("{cut}..."),
    }
}
