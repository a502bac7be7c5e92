//! IDMC internal-displacement exports (one row per displacement event or figure).

use crate::error::Result;
use crate::filter::RowFilter;
use crate::models::{EventFilter, IndicatorSpec};
use crate::select::select_indicators;
use crate::table::{CsvOptions, Table};
use std::path::Path;

/// Columns placed in front of the selected indicators.
pub const BASE_COLUMNS: [&str; 3] = ["iso3", "start_date", "year"];

/// Read an IDMC CSV (UTF-8), filter it, and keep the requested indicator columns.
///
/// Non-numeric `year` values become missing; such rows only survive when no year
/// bound is given.
pub fn get_data_idmc<P: AsRef<Path>>(
    path: P,
    indicators: &IndicatorSpec,
    filter: &EventFilter,
) -> Result<Table> {
    get_data_idmc_with(path, &CsvOptions::default(), indicators, filter)
}

pub fn get_data_idmc_with<P: AsRef<Path>>(
    path: P,
    csv: &CsvOptions,
    indicators: &IndicatorSpec,
    filter: &EventFilter,
) -> Result<Table> {
    let mut table = Table::from_csv_path(path, csv)?;
    table.normalize_columns();
    table.coerce_int_column("year")?;

    let table = RowFilter::from(filter).apply(&table)?;
    let out = select_indicators(&table, &BASE_COLUMNS, indicators)?;
    log::info!("idmc: {} rows", out.len());
    Ok(out)
}
