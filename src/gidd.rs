//! Client for the **IDMC GIDD disaster listing** (`external-api/gidd/disasters/`).
//!
//! The listing is cursor-paginated: each page is `{ "results": [...], "next": <url|null> }`
//! and `next` already carries every query parameter needed for the following page.
//! Pages are fetched until the server stops sending `next`; there is no page cap.
//!
//! Typical usage:
//! ```no_run
//! # use dispdata::gidd::{GiddClient, GiddQuery, get_data_gidd};
//! # use dispdata::{EventFilter, YearRange};
//! let client = GiddClient::default();
//! let query = GiddQuery::new("MY-CLIENT-ID")
//!     .filter(EventFilter::new().iso3(["SDN"]).years(YearRange::new(Some(2018), None)));
//! let table = get_data_gidd(&client, &query)?;
//! # Ok::<(), dispdata::Error>(())
//! ```

use crate::error::Result;
use crate::filter::RowFilter;
use crate::http::{HttpClient, JsonGet};
use crate::models::{EventFilter, GiddPage, IndicatorSpec};
use crate::select::select_indicators;
use crate::table::Table;
use serde_json::{Map, Value};

pub const GIDD_DISASTERS_URL: &str =
    "https://helix-tools-api.idmcdb.org/external-api/gidd/disasters/";

pub const DEFAULT_LIMIT: u32 = 500;

/// Columns placed in front of the selected indicators.
pub const BASE_COLUMNS: [&str; 3] = ["iso3", "year", "start_date"];

#[derive(Debug, Clone)]
pub struct GiddClient<H = HttpClient> {
    pub base_url: String,
    http: H,
}

impl Default for GiddClient<HttpClient> {
    fn default() -> Self {
        Self::new(HttpClient::default())
    }
}

impl<H: JsonGet> GiddClient<H> {
    pub fn new(http: H) -> Self {
        Self {
            base_url: GIDD_DISASTERS_URL.into(),
            http,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch every page and concatenate the `results` arrays in page order.
    ///
    /// Any failed page aborts the whole fetch; already-fetched pages are discarded.
    pub fn fetch_all(&self, client_id: &str, limit: u32) -> Result<Vec<Map<String, Value>>> {
        let first = [("client_id", client_id.to_string()), ("limit", limit.to_string())];
        let mut url = self.base_url.clone();
        let mut query: &[(&str, String)] = &first;
        let mut records = Vec::new();
        let mut page_no = 1u32;

        loop {
            let v = self.http.get_json(&url, query)?;
            let page: GiddPage = serde_json::from_value(v)?;
            log::debug!("gidd page {}: {} records", page_no, page.results.len());
            records.extend(page.results);

            match page.next {
                Some(next) if !next.trim().is_empty() => {
                    url = next;
                    query = &[];
                    page_no += 1;
                }
                _ => break,
            }
        }
        Ok(records)
    }
}

/// Parameters of [`get_data_gidd`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GiddQuery {
    pub client_id: String,
    /// Page size of the first request.
    pub limit: u32,
    pub filter: EventFilter,
    pub indicators: IndicatorSpec,
}

impl GiddQuery {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            limit: DEFAULT_LIMIT,
            filter: EventFilter::default(),
            indicators: IndicatorSpec::AllColumns,
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn filter(mut self, filter: EventFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn indicators(mut self, indicators: impl Into<IndicatorSpec>) -> Self {
        self.indicators = indicators.into();
        self
    }
}

/// Fetch all GIDD disaster records, then normalize, filter, and select columns.
///
/// `year` is coerced to a nullable integer; values that are not numbers become
/// missing rather than failing the call.
pub fn get_data_gidd<H: JsonGet>(client: &GiddClient<H>, query: &GiddQuery) -> Result<Table> {
    let records = client.fetch_all(&query.client_id, query.limit)?;
    let mut table = Table::from_records(&records);
    table.normalize_columns();
    table.coerce_int_column("year")?;

    let table = RowFilter::from(&query.filter).apply(&table)?;
    let out = select_indicators(&table, &BASE_COLUMNS, &query.indicators)?;
    log::info!("gidd: {} of {} records kept", out.len(), records.len());
    Ok(out)
}
