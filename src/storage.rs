use crate::error::Result;
use crate::table::{Cell, Table};
use csv::WriterBuilder;
use std::borrow::Cow;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Leading characters that make spreadsheet tools evaluate a cell as a formula.
const FORMULA_STARTERS: [char; 4] = ['=', '+', '-', '@'];

/// Text for one CSV field; formula-like text is prefixed with `'`.
fn csv_field(cell: &Cell) -> Cow<'_, str> {
    match cell {
        Cell::Text(s) if s.starts_with(FORMULA_STARTERS) => Cow::Owned(format!("'{s}")),
        Cell::Text(s) => Cow::Borrowed(s),
        other => Cow::Owned(other.to_string()),
    }
}

/// Write a table as CSV with header to any writer.
pub fn write_csv<W: Write>(table: &Table, out: W) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(out);
    wtr.write_record(table.columns())?;
    for row in table.rows() {
        let fields: Vec<Cow<'_, str>> = row.iter().map(csv_field).collect();
        wtr.write_record(fields.iter().map(|f| f.as_bytes()))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save a table as CSV with header.
pub fn save_csv<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    write_csv(table, File::create(path)?)
}

/// Save a table as a pretty JSON array of objects.
pub fn save_json<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(&table.to_records())?;
    f.write_all(s.as_bytes())?;
    Ok(())
}
