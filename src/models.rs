use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Inclusive year bounds; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub start: Option<i32>,
    pub end: Option<i32>,
}

impl YearRange {
    pub fn new(start: Option<i32>, end: Option<i32>) -> Self {
        Self { start, end }
    }

    /// No bound on either side.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, year: i64) -> bool {
        self.start.is_none_or(|s| year >= i64::from(s))
            && self.end.is_none_or(|e| year <= i64::from(e))
    }
}

/// Filters shared by the displacement pipelines (IDMC file and GIDD API).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// ISO3 codes to keep; a lone `"all"` keeps every country.
    pub iso3: Option<Vec<String>>,
    pub years: YearRange,
    pub hazard_category_name: Option<String>,
    pub hazard_type_name: Option<String>,
}

impl EventFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iso3<S: Into<String>>(mut self, codes: impl IntoIterator<Item = S>) -> Self {
        self.iso3 = Some(codes.into_iter().map(Into::into).collect());
        self
    }

    pub fn years(mut self, years: YearRange) -> Self {
        self.years = years;
        self
    }

    pub fn hazard_category(mut self, name: impl Into<String>) -> Self {
        self.hazard_category_name = Some(name.into());
        self
    }

    pub fn hazard_type(mut self, name: impl Into<String>) -> Self {
        self.hazard_type_name = Some(name.into());
        self
    }
}

/// Ordered mapping from a short indicator code to its display name.
///
/// Used both to pick source columns and to rename them; iteration order is
/// insertion order and decides output column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorMap {
    entries: Vec<(String, String)>,
}

impl IndicatorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a code; an existing code keeps its position and gets the new name.
    pub fn insert(&mut self, code: impl Into<String>, name: impl Into<String>) {
        let code = code.into();
        let name = name.into();
        match self.entries.iter_mut().find(|(c, _)| *c == code) {
            Some(slot) => slot.1 = name,
            None => self.entries.push((code, name)),
        }
    }

    pub fn get(&self, code: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, n)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(c, n)| (c.as_str(), n.as_str()))
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, n)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for IndicatorMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = IndicatorMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Which indicator columns a pipeline keeps next to its base columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IndicatorSpec {
    /// Keep every column, base columns first.
    #[default]
    AllColumns,
    /// Keep only these codes, renamed to their display names.
    Selected(IndicatorMap),
}

impl From<IndicatorMap> for IndicatorSpec {
    fn from(map: IndicatorMap) -> Self {
        IndicatorSpec::Selected(map)
    }
}

/// Country selection for World Bank requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Countries {
    #[default]
    All,
    /// ISO2/ISO3 or aggregate codes (`"TD"`, `"TCD"`, `"EUU"`…).
    Codes(Vec<String>),
}

impl Countries {
    /// The path segment used by the indicator endpoint (`all` or unencoded codes).
    pub fn codes(&self) -> Vec<&str> {
        match self {
            Countries::All => vec!["all"],
            Countries::Codes(codes) => codes.iter().map(|s| s.as_str()).collect(),
        }
    }
}

/// Metadata section returned by the World Bank API (position 0).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub page: u32,
    pub pages: u32,
    /// Some responses encode `per_page` as a string, others as a number.
    /// Accept both and normalize to `u32`.
    #[serde(deserialize_with = "de_u32_from_string_or_number")]
    pub per_page: u32,
    pub total: u32,
}

/// Serde helper: parse `u32` from either a JSON number or a string.
fn de_u32_from_string_or_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct U32Visitor;

    impl Visitor<'_> for U32Visitor {
        type Value = u32;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a string or integer representing a non-negative number")
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u32::try_from(v).map_err(E::custom)
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u32::try_from(v).map_err(|_| E::custom("negative value for u32"))
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            s.trim().parse::<u32>().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(U32Visitor)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeName {
    pub id: String,
    pub value: String,
}

/// Raw World Bank observation (position 1 array).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub indicator: CodeName,
    pub country: CodeName,
    /// Absent on some older payloads; `country.id` stands in then.
    #[serde(default)]
    pub countryiso3code: Option<String>,
    pub date: String,
    pub value: Option<f64>,
}

impl Entry {
    pub fn iso3(&self) -> &str {
        self.countryiso3code.as_deref().unwrap_or(&self.country.id)
    }
}

/// One page of the GIDD disaster listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GiddPage {
    #[serde(default)]
    pub results: Vec<Map<String, Value>>,
    #[serde(default)]
    pub next: Option<String>,
}
