//! Synchronous client for the **World Bank Indicators API (v2)**.
//!
//! This module focuses on the `country/{codes}/indicator/{code}` endpoint. Each indicator
//! is fetched on its own (all pages), reshaped into `(Country, ISO3, Year, <name>)` rows,
//! and the per-indicator tables are outer-joined on `(Country, ISO3, Year)`.
//!
//! ### Notes
//! - The API sometimes serializes `per_page` as a **string**; we accept both string/number.
//! - Requests are not retried; a non-success status aborts the call.
//!
//! Typical usage:
//! ```no_run
//! # use dispdata::wb::{WorldBankClient, get_data_wb};
//! # use dispdata::{Countries, IndicatorMap, YearRange};
//! let client = WorldBankClient::default();
//! let indicators: IndicatorMap = [("SP.POP.TOTL", "Population")].into_iter().collect();
//! let years = YearRange::new(Some(2010), None);
//! let table = get_data_wb(&client, &indicators, &Countries::All, years)?;
//! # Ok::<(), dispdata::Error>(())
//! ```

use crate::error::{Error, Result};
use crate::filter::RowFilter;
use crate::http::{HttpClient, JsonGet};
use crate::models::{Countries, Entry, IndicatorMap, Meta, YearRange};
use crate::table::{Cell, Table};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;
use std::collections::BTreeMap;

pub const WORLD_BANK_URL: &str = "https://api.worldbank.org/v2";

pub const KEY_COLUMNS: [&str; 3] = ["Country", "ISO3", "Year"];

// Safety cap to avoid pathological jobs
const MAX_PAGES: u32 = 1000;

#[derive(Debug, Clone)]
pub struct WorldBankClient<H = HttpClient> {
    pub base_url: String,
    http: H,
}

impl Default for WorldBankClient<HttpClient> {
    fn default() -> Self {
        Self::new(HttpClient::default())
    }
}

// Allow -, _, . unescaped in codes (common for indicator ids)
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

fn enc_join<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(|s| percent_encoding::utf8_percent_encode(s.trim(), SAFE).to_string())
        .collect::<Vec<_>>()
        .join(";")
}

impl<H: JsonGet> WorldBankClient<H> {
    pub fn new(http: H) -> Self {
        Self {
            base_url: WORLD_BANK_URL.into(),
            http,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch every observation of one indicator for the selected countries.
    ///
    /// ### Errors
    /// - Network/HTTP error
    /// - JSON decoding error
    /// - API-level error payload (surfaced as [`Error::Api`])
    pub fn fetch_indicator(&self, indicator: &str, countries: &Countries) -> Result<Vec<Entry>> {
        let url = format!(
            "{}/country/{}/indicator/{}",
            self.base_url,
            enc_join(countries.codes()),
            enc_join([indicator])
        );

        // Paginate until we retrieved all pages.
        let mut page = 1u32;
        let mut out: Vec<Entry> = Vec::new();
        loop {
            if page > MAX_PAGES {
                return Err(Error::Api(format!("page limit exceeded ({MAX_PAGES})")));
            }
            let query = [
                ("format", "json".to_string()),
                ("per_page", "1000".to_string()),
                ("page", page.to_string()),
            ];
            let v = self.http.get_json(&url, &query)?;

            // The API returns an array: [Meta, [Entry, ...]] or a "message" object in position 0 on error.
            let arr = v.as_array().ok_or_else(|| {
                Error::Api("unexpected response shape: not a top-level array".into())
            })?;
            let Some(head) = arr.first() else {
                return Err(Error::Api("unexpected response: empty array".into()));
            };
            if head.get("message").is_some() {
                return Err(Error::Api(format!("world bank api error: {head}")));
            }

            let meta: Meta = serde_json::from_value(head.clone())?;
            let entries: Vec<Entry> = match arr.get(1) {
                Some(Value::Null) | None => vec![],
                Some(list) => serde_json::from_value(list.clone())?,
            };
            log::debug!(
                "{indicator}: page {}/{} ({} records)",
                meta.page,
                meta.pages,
                entries.len()
            );
            out.extend(entries);

            if page >= meta.pages {
                break;
            }
            page += 1;
        }
        Ok(out)
    }
}

/// Key of the outer join: (Country, ISO3, Year).
type RowKey = (String, String, i64);

/// Outer-join per-indicator observations on (Country, ISO3, Year).
///
/// `per_indicator[i]` holds the entries for the i-th column of `names`. Every key seen
/// in any indicator yields exactly one row, ordered by key; an indicator without an
/// observation for that key is `Null`. A repeated key within one indicator keeps its
/// first observation.
pub fn outer_merge(names: &[&str], per_indicator: &[Vec<Entry>]) -> Result<Table> {
    let width = names.len();
    let mut merged: BTreeMap<RowKey, Vec<Option<Cell>>> = BTreeMap::new();

    for (col, entries) in per_indicator.iter().enumerate() {
        for e in entries {
            let year = e.date.trim().parse::<i64>().map_err(|_| Error::YearValue {
                indicator: e.indicator.id.clone(),
                value: e.date.clone(),
            })?;
            let key = (e.country.value.clone(), e.iso3().to_string(), year);
            let slots = merged.entry(key).or_insert_with(|| vec![None; width]);
            if slots[col].is_none() {
                slots[col] = Some(Cell::from(e.value));
            }
        }
    }

    let mut table = Table::new(KEY_COLUMNS.iter().copied().chain(names.iter().copied()));
    for ((country, iso3, year), slots) in merged {
        let mut row = vec![Cell::Text(country), Cell::Text(iso3), Cell::Int(year)];
        row.extend(slots.into_iter().map(|s| s.unwrap_or(Cell::Null)));
        table.push_row(row);
    }
    Ok(table)
}

/// Fetch several indicators and return one wide table.
///
/// Columns are `Country, ISO3, Year` followed by the display names in map order. The
/// year filter is applied after the merge. With no indicators the result is an empty
/// table with only the key columns.
pub fn get_data_wb<H: JsonGet>(
    client: &WorldBankClient<H>,
    indicators: &IndicatorMap,
    countries: &Countries,
    years: YearRange,
) -> Result<Table> {
    let per_indicator = indicators
        .codes()
        .map(|code| client.fetch_indicator(code, countries))
        .collect::<Result<Vec<_>>>()?;
    let names: Vec<&str> = indicators.names().collect();

    let merged = outer_merge(&names, &per_indicator)?;
    let out = RowFilter::new().years("Year", years).apply(&merged)?;
    log::info!(
        "world bank: {} indicators, {} country-years",
        indicators.len(),
        out.len()
    );
    Ok(out)
}
