//! Human Development Index exports (UNDP composite indices time series).
//!
//! The file is wide: `iso3, country, hdicode, region, hdi_1990, hdi_1991, …, le_1990, …`.
//! [`get_data_hdi`] turns the metric-year columns named by an [`IndicatorMap`] into
//! long-format observations and filters them by country name and year.

use crate::error::Result;
use crate::filter::RowFilter;
use crate::models::{IndicatorMap, YearRange};
use crate::reshape::wide_to_long;
use crate::table::{CsvOptions, Table};
use std::path::Path;

/// Parameters of [`get_data_hdi`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HdiQuery {
    /// Country names, matched case-insensitively.
    pub countries: Option<Vec<String>>,
    pub years: YearRange,
}

impl HdiQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn countries<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.countries = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn country(self, name: impl Into<String>) -> Self {
        let name: String = name.into();
        self.countries([name])
    }

    pub fn years(mut self, years: YearRange) -> Self {
        self.years = years;
        self
    }
}

/// Read an HDI export (ISO-8859-1) and return long-format observations.
pub fn get_data_hdi<P: AsRef<Path>>(
    path: P,
    indicators: &IndicatorMap,
    query: &HdiQuery,
) -> Result<Table> {
    get_data_hdi_with(path, &CsvOptions::latin1(), indicators, query)
}

/// Like [`get_data_hdi`] with explicit CSV options.
pub fn get_data_hdi_with<P: AsRef<Path>>(
    path: P,
    csv: &CsvOptions,
    indicators: &IndicatorMap,
    query: &HdiQuery,
) -> Result<Table> {
    let mut wide = Table::from_csv_path(path, csv)?;
    wide.normalize_columns();
    hdi_from_table(&wide, indicators, query)
}

/// Reshape and filter an already-normalized wide table.
pub fn hdi_from_table(
    wide: &Table,
    indicators: &IndicatorMap,
    query: &HdiQuery,
) -> Result<Table> {
    let long = wide_to_long(wide, indicators)?;

    let mut filter = RowFilter::new();
    if let Some(names) = &query.countries {
        filter = filter.one_of_ignore_case("country", names.iter().map(String::as_str));
    }
    let out = filter.years("year", query.years).apply(&long)?;
    log::info!("hdi: {} observations", out.len());
    Ok(out)
}
