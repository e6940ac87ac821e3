//! Rendering record lists for the terminal.

use std::io::Write;

use serde::Serialize;

use super::OutputFormat;
use crate::record::Record;

/// Shown when a search leaves nothing to display.
pub const NO_MATCHES: &str = "No uploaded texts matching your search.";

/// Widest text column in table output before truncation.
const TABLE_TEXT_WIDTH: usize = 48;

#[derive(Serialize)]
struct JsonRow<'a> {
    row: usize,
    #[serde(flatten)]
    record: &'a Record,
}

/// Write `records` in the requested format.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn render(out: &mut impl Write, records: &[&Record], format: OutputFormat) -> crate::Result<()> {
    match format {
        OutputFormat::Plain => render_plain(out, records)?,
        OutputFormat::Table => render_table(out, records)?,
        OutputFormat::Json => {
            let rows: Vec<JsonRow<'_>> = records
                .iter()
                .enumerate()
                .map(|(i, record)| JsonRow { row: i + 1, record })
                .collect();
            serde_json::to_writer_pretty(&mut *out, &rows)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn render_plain(out: &mut impl Write, records: &[&Record]) -> std::io::Result<()> {
    if records.is_empty() {
        return writeln!(out, "{NO_MATCHES}");
    }
    for (i, record) in records.iter().enumerate() {
        writeln!(out, "{:>2}. [{}] {}", i + 1, record.created_at_display(), record.text)?;
    }
    Ok(())
}

fn render_table(out: &mut impl Write, records: &[&Record]) -> std::io::Result<()> {
    if records.is_empty() {
        return writeln!(out, "{NO_MATCHES}");
    }
    writeln!(out, "{:>3}  {:<w$}  Uploaded At", "#", "Text", w = TABLE_TEXT_WIDTH)?;
    writeln!(out, "{}", "-".repeat(3 + 2 + TABLE_TEXT_WIDTH + 2 + 19))?;
    for (i, record) in records.iter().enumerate() {
        writeln!(
            out,
            "{:>3}  {:<w$}  {}",
            i + 1,
            truncate_cell(&record.text, TABLE_TEXT_WIDTH),
            record.created_at_display(),
            w = TABLE_TEXT_WIDTH
        )?;
    }
    Ok(())
}

/// Flatten line breaks and cut to `width` characters.
fn truncate_cell(text: &str, width: usize) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    if flat.chars().count() <= width {
        flat
    } else {
        let mut cut: String = flat.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}
