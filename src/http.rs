//! Blocking JSON GET used by the World Bank and GIDD fetchers.
//!
//! Fetchers are generic over [`JsonGet`] so they can be driven by a canned
//! transport in tests. There is no retry: a non-success status or a transport
//! failure is returned to the caller as-is.

use crate::error::{Error, Result};
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use serde_json::Value;
use std::time::Duration;

/// Issue a GET and decode the body as JSON.
pub trait JsonGet {
    /// `query` is appended to `url`; pass an empty slice to use `url` verbatim.
    fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value>;
}

impl<T: JsonGet + ?Sized> JsonGet for &T {
    fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        (**self).get_json(url, query)
    }
}

/// `reqwest` blocking client with bounded timeouts and redirects.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: Client,
}

impl HttpClient {
    pub fn try_new() -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30)) // total request timeout
            .connect_timeout(Duration::from_secs(10))
            .redirect(Policy::limited(5))
            .user_agent(concat!("dispdata/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::try_new().expect("reqwest client build")
    }
}

impl JsonGet for HttpClient {
    fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        let mut req = self.http.get(url);
        if !query.is_empty() {
            req = req.query(query);
        }
        let resp = req.send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status,
            });
        }
        Ok(resp.json()?)
    }
}
