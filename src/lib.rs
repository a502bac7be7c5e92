//! dispdata
//!
//! A lightweight Rust library for retrieving human development, internal displacement,
//! and World Bank indicator data in one tidy tabular shape. Pairs with the `dispdata` CLI.
//!
//! ### Features
//! - HDI exports: wide `<metric>_<year>` columns reshaped into long observations
//! - IDMC displacement exports and the GIDD disaster API (cursor pagination)
//! - World Bank indicators outer-joined on country and year
//! - Filters by country, inclusive year range, and hazard category/type
//! - Save results as CSV or JSON
//!
//! ### Example
//! ```no_run
//! use dispdata::{HdiQuery, IndicatorMap, YearRange};
//!
//! let indicators: IndicatorMap = [("hdi", "Human Development Index")].into_iter().collect();
//! let query = HdiQuery::new()
//!     .countries(["Chad", "Niger"])
//!     .years(YearRange::new(Some(2000), Some(2020)));
//! let table = dispdata::hdi::get_data_hdi("HDR23-24_Composite_indices.csv", &indicators, &query)?;
//! dispdata::storage::save_csv(&table, "hdi_2000_2020.csv")?;
//! # Ok::<(), dispdata::Error>(())
//! ```

pub mod error;
pub mod filter;
pub mod gidd;
pub mod hdi;
pub mod http;
pub mod idmc;
pub mod models;
pub mod reshape;
pub mod select;
pub mod storage;
pub mod table;
pub mod wb;

pub use error::{Error, Result};
pub use gidd::{GiddClient, GiddQuery};
pub use hdi::HdiQuery;
pub use http::{HttpClient, JsonGet};
pub use models::{Countries, EventFilter, IndicatorMap, IndicatorSpec, YearRange};
pub use table::{Cell, CsvOptions, Encoding, Table};
pub use wb::WorldBankClient;
