//! Shared fixtures for integration tests.
#![allow(dead_code)]

use dispdata::{Error, JsonGet, Result};
use reqwest::StatusCode;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// Canned transport keyed by `url` or `url?k=v&k=v` (query in call order).
#[derive(Default)]
pub struct FakeHttp {
    responses: HashMap<String, std::result::Result<Value, StatusCode>>,
    pub calls: RefCell<Vec<String>>,
}

impl FakeHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, body: Value) -> Self {
        self.responses.insert(key.to_string(), Ok(body));
        self
    }

    pub fn with_status(mut self, key: &str, status: StatusCode) -> Self {
        self.responses.insert(key.to_string(), Err(status));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl JsonGet for FakeHttp {
    fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        let key = if query.is_empty() {
            url.to_string()
        } else {
            let q: Vec<String> = query.iter().map(|(k, v)| format!("{k}={v}")).collect();
            format!("{url}?{}", q.join("&"))
        };
        self.calls.borrow_mut().push(key.clone());
        match self.responses.get(&key) {
            Some(Ok(v)) => Ok(v.clone()),
            Some(Err(status)) => Err(Error::HttpStatus {
                url: key,
                status: *status,
            }),
            None => Err(Error::HttpStatus {
                url: key,
                status: StatusCode::NOT_FOUND,
            }),
        }
    }
}

/// Write `contents` to a CSV file inside a fresh temp dir.
pub fn csv_file(contents: &[u8]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.csv");
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(contents).unwrap();
    (dir, path)
}
