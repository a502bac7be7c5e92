//! In-memory table used by every pipeline.
//!
//! A [`Table`] is a list of column names plus row-major [`Cell`]s. It is built fresh
//! for each call (from a CSV file or from JSON records), transformed, and handed back
//! to the caller. Row positions carry no meaning beyond order.

use crate::error::{Error, Result};
use ahash::AHashMap;
use serde::Serialize;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt;
use std::io::Read;
use std::path::Path;

/// Field contents that load as a missing value.
const NA_MARKERS: &[&str] = &["", "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "#N/A"];

/// One value in a [`Table`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    /// Missing value.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    /// Map a JSON value onto a cell. Arrays and objects are kept as compact JSON text.
    pub fn from_json(v: &Value) -> Cell {
        match v {
            Value::Null => Cell::Null,
            Value::Bool(b) => Cell::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Cell::Int(i),
                None => n.as_f64().map_or(Cell::Null, Cell::Float),
            },
            Value::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Cell::Null => Value::Null,
            Cell::Bool(b) => Value::Bool(*b),
            Cell::Int(i) => Value::from(*i),
            Cell::Float(f) => serde_json::Number::from_f64(*f).map_or(Value::Null, Value::Number),
            Cell::Text(s) => Value::String(s.clone()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Integer view: ints, integral floats, and text holding either.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Int(i) => Some(*i),
            Cell::Float(f) => float_to_int(*f),
            Cell::Text(s) => {
                let t = s.trim();
                t.parse::<i64>()
                    .ok()
                    .or_else(|| t.parse::<f64>().ok().and_then(float_to_int))
            }
            Cell::Null | Cell::Bool(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(i) => Some(*i as f64),
            Cell::Float(f) => Some(*f),
            Cell::Text(s) => s.trim().parse().ok(),
            Cell::Null | Cell::Bool(_) => None,
        }
    }

    /// Textual view of a non-null cell.
    pub fn text(&self) -> Option<Cow<'_, str>> {
        match self {
            Cell::Null => None,
            Cell::Text(s) => Some(Cow::Borrowed(s)),
            other => Some(Cow::Owned(other.to_string())),
        }
    }
}

fn float_to_int(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Int(i) => write!(f, "{i}"),
            Cell::Float(x) => write!(f, "{x}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<i64> for Cell {
    fn from(i: i64) -> Self {
        Cell::Int(i)
    }
}

impl From<f64> for Cell {
    fn from(f: f64) -> Self {
        Cell::Float(f)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map_or(Cell::Null, Into::into)
    }
}

/// Text encoding of a CSV source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    #[default]
    Utf8,
    /// ISO-8859-1, decoded with its WHATWG superset windows-1252.
    Latin1,
}

impl Encoding {
    /// Decode a whole source. Malformed input is rejected, never repaired.
    fn decode<'a>(&self, bytes: &'a [u8], origin: &str) -> Result<Cow<'a, str>> {
        let enc = match self {
            Encoding::Utf8 => encoding_rs::UTF_8,
            Encoding::Latin1 => encoding_rs::WINDOWS_1252,
        };
        let (text, _, had_errors) = enc.decode(bytes);
        if had_errors {
            return Err(Error::Encoding {
                origin: origin.to_string(),
                encoding: enc.name(),
            });
        }
        Ok(text)
    }
}

/// Type shared by every non-missing field of a CSV column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldType {
    Int,
    Float,
    Text,
}

impl FieldType {
    /// Narrowest type that every non-NA field parses as.
    fn infer<'a>(fields: impl IntoIterator<Item = &'a str>) -> FieldType {
        let mut ty = FieldType::Int;
        for f in fields.into_iter().map(str::trim) {
            if is_na(f) {
                continue;
            }
            if ty == FieldType::Int && f.parse::<i64>().is_err() {
                ty = FieldType::Float;
            }
            if ty == FieldType::Float && f.parse::<f64>().is_err() {
                return FieldType::Text;
            }
        }
        ty
    }

    fn cell(self, raw: &str) -> Cell {
        let t = raw.trim();
        if is_na(t) {
            return Cell::Null;
        }
        match self {
            FieldType::Int => t.parse().map_or(Cell::Null, Cell::Int),
            FieldType::Float => t.parse().map_or(Cell::Null, Cell::Float),
            FieldType::Text => Cell::Text(raw.to_string()),
        }
    }
}

fn is_na(field: &str) -> bool {
    NA_MARKERS.contains(&field)
}

/// How to read a CSV source.
#[derive(Debug, Clone, Copy)]
pub struct CsvOptions {
    pub encoding: Encoding,
    pub delimiter: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            encoding: Encoding::Utf8,
            delimiter: b',',
        }
    }
}

impl CsvOptions {
    pub fn latin1() -> Self {
        Self {
            encoding: Encoding::Latin1,
            ..Self::default()
        }
    }
}

/// Trim, lowercase, and replace spaces with underscores.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Column names plus row-major cells. Every row has exactly one cell per column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Empty table with the given header.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Short rows are padded with `Null`, long rows truncated.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Null);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| Error::missing(name))
    }

    /// All cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Result<Vec<&Cell>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// Cell at `row` in column `name`, if both exist.
    pub fn get(&self, row: usize, name: &str) -> Option<&Cell> {
        let idx = self.columns.iter().position(|c| c == name)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    pub fn normalize_columns(&mut self) {
        for c in &mut self.columns {
            *c = normalize_column_name(c);
        }
    }

    /// Coerce a column to nullable integers; values without an integer reading become `Null`.
    pub fn coerce_int_column(&mut self, name: &str) -> Result<()> {
        let idx = self.column_index(name)?;
        for row in &mut self.rows {
            row[idx] = row[idx].as_i64().map_or(Cell::Null, Cell::Int);
        }
        Ok(())
    }

    /// Rows for which `keep` returns true, in order.
    pub fn filter_rows(&self, mut keep: impl FnMut(&[Cell]) -> bool) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }

    /// Build a table from `(source column, output name)` pairs.
    pub fn project(&self, columns: &[(&str, &str)]) -> Result<Table> {
        let idx = columns
            .iter()
            .map(|(src, _)| self.column_index(src))
            .collect::<Result<Vec<_>>>()?;
        Ok(Table {
            columns: columns.iter().map(|(_, out)| out.to_string()).collect(),
            rows: self
                .rows
                .iter()
                .map(|r| idx.iter().map(|&i| r[i].clone()).collect())
                .collect(),
        })
    }

    /// Read a CSV file; the header comes from the first row.
    pub fn from_csv_path<P: AsRef<Path>>(path: P, opts: &CsvOptions) -> Result<Table> {
        let path = path.as_ref();
        log::debug!("reading {} ({:?})", path.display(), opts.encoding);
        let bytes = std::fs::read(path)?;
        Self::from_csv_bytes(&bytes, opts, &path.display().to_string())
    }

    pub fn from_csv_reader<R: Read>(mut rdr: R, opts: &CsvOptions) -> Result<Table> {
        let mut bytes = Vec::new();
        rdr.read_to_end(&mut bytes)?;
        Self::from_csv_bytes(&bytes, opts, "csv input")
    }

    /// Fields are typed per column: a column becomes `Int` or `Float` only when all
    /// of its non-NA fields parse as one, otherwise it stays text.
    fn from_csv_bytes(bytes: &[u8], opts: &CsvOptions, origin: &str) -> Result<Table> {
        let text = opts.encoding.decode(bytes, origin)?;
        let mut csv_rdr = csv::ReaderBuilder::new()
            .delimiter(opts.delimiter)
            .from_reader(text.as_bytes());
        let mut table = Table::new(csv_rdr.headers()?.iter());
        let records = csv_rdr
            .records()
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let types: Vec<FieldType> = (0..table.columns.len())
            .map(|i| FieldType::infer(records.iter().map(|r| r.get(i).unwrap_or(""))))
            .collect();
        for rec in &records {
            let row = types
                .iter()
                .enumerate()
                .map(|(i, ty)| ty.cell(rec.get(i).unwrap_or("")))
                .collect();
            table.push_row(row);
        }
        Ok(table)
    }

    /// Build a table from JSON objects. Columns are the union of keys in first-seen
    /// order; a record lacking a key gets `Null` there.
    pub fn from_records(records: &[Map<String, Value>]) -> Table {
        let mut index: AHashMap<&str, usize> = AHashMap::new();
        let mut columns: Vec<String> = Vec::new();
        for rec in records {
            for key in rec.keys() {
                if !index.contains_key(key.as_str()) {
                    index.insert(key.as_str(), columns.len());
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .map(|rec| {
                let mut row = vec![Cell::Null; columns.len()];
                for (k, v) in rec {
                    if let Some(&i) = index.get(k.as_str()) {
                        row[i] = Cell::from_json(v);
                    }
                }
                row
            })
            .collect();
        Table { columns, rows }
    }

    /// Rows as JSON objects keyed by column name.
    pub fn to_records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|r| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(r.iter().map(Cell::to_json))
                    .collect()
            })
            .collect()
    }
}
