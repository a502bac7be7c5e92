//! Wide-to-long reshape for HDI-style tables.
//!
//! Input has one column per `<metric>_<year>` pair next to the identity columns
//! `iso3`, `country`, `region`. Output has one row per (entity, metric, year).

use crate::error::{Error, Result};
use crate::models::IndicatorMap;
use crate::table::{Cell, Table};
use ahash::AHashMap;

pub const ID_COLUMNS: [&str; 3] = ["iso3", "country", "region"];

/// Output header of [`wide_to_long`].
pub const LONG_COLUMNS: [&str; 7] = [
    "iso3",
    "country",
    "region",
    "metric",
    "metric_name",
    "year",
    "value",
];

/// Split `name` on its last underscore into (metric, year).
///
/// `life_exp_2010` → (`life_exp`, 2010).
pub fn split_metric_year(name: &str) -> Result<(&str, i32)> {
    let bad = || Error::YearSuffix {
        column: name.to_string(),
    };
    let (metric, year) = name.rsplit_once('_').ok_or_else(bad)?;
    let year = year.trim().parse::<i32>().map_err(|_| bad())?;
    Ok((metric, year))
}

/// Columns selected for unpivoting: any column starting with `<code>_` for some code.
pub fn metric_columns<'a>(columns: &'a [String], indicators: &IndicatorMap) -> Vec<&'a str> {
    let prefixes: Vec<String> = indicators.codes().map(|c| format!("{c}_")).collect();
    columns
        .iter()
        .map(String::as_str)
        .filter(|col| prefixes.iter().any(|p| col.starts_with(p.as_str())))
        .collect()
}

/// Unpivot the metric-year columns of a normalized table.
///
/// Rows come out in input row order, and within a row in column order.
/// `metric_name` is `Null` when the split-off metric is not a code of `indicators`.
pub fn wide_to_long(table: &Table, indicators: &IndicatorMap) -> Result<Table> {
    let id_idx = ID_COLUMNS
        .iter()
        .map(|c| table.column_index(c))
        .collect::<Result<Vec<_>>>()?;

    let names: AHashMap<&str, &str> = indicators.iter().collect();

    // Parse every selected column up front so a bad suffix aborts before any output.
    let selected = metric_columns(table.columns(), indicators)
        .into_iter()
        .map(|col| {
            let (metric, year) = split_metric_year(col)?;
            let name = Cell::from(names.get(metric).copied());
            Ok((table.column_index(col)?, Cell::from(metric), name, year))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut out = Table::new(LONG_COLUMNS);
    for row in table.rows() {
        for (idx, metric, metric_name, year) in &selected {
            let mut cells: Vec<Cell> = id_idx.iter().map(|&i| row[i].clone()).collect();
            cells.push(metric.clone());
            cells.push(metric_name.clone());
            cells.push(Cell::Int(i64::from(*year)));
            cells.push(row[*idx].clone());
            out.push_row(cells);
        }
    }
    log::debug!(
        "reshaped {} rows x {} metric columns into {} observations",
        table.len(),
        selected.len(),
        out.len()
    );
    Ok(out)
}
