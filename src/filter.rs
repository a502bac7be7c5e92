//! Row filter primitives shared by the pipelines.
//!
//! A [`RowFilter`] is a conjunction: a row is kept only if it satisfies every
//! criterion added to it. An empty filter keeps the whole table. Missing values
//! never satisfy a criterion.

use crate::error::Result;
use crate::models::{EventFilter, YearRange};
use crate::table::{Cell, Table};

#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    /// Cell equals one of `values`.
    OneOf {
        column: String,
        values: Vec<String>,
        case_insensitive: bool,
    },
    /// Cell reads as an integer inside `range` (inclusive).
    YearBetween { column: String, range: YearRange },
    /// Cell text equals `value`, ignoring case.
    EqualsIgnoreCase { column: String, value: String },
}

impl Criterion {
    fn column(&self) -> &str {
        match self {
            Criterion::OneOf { column, .. }
            | Criterion::YearBetween { column, .. }
            | Criterion::EqualsIgnoreCase { column, .. } => column,
        }
    }

    fn matches(&self, cell: &Cell) -> bool {
        match self {
            Criterion::OneOf {
                values,
                case_insensitive,
                ..
            } => cell.text().is_some_and(|t| {
                if *case_insensitive {
                    let t = t.to_lowercase();
                    values.iter().any(|v| v.to_lowercase() == t)
                } else {
                    values.iter().any(|v| *v == *t)
                }
            }),
            Criterion::YearBetween { range, .. } => {
                cell.as_i64().is_some_and(|y| range.contains(y))
            }
            Criterion::EqualsIgnoreCase { value, .. } => cell
                .text()
                .is_some_and(|t| t.to_lowercase() == value.to_lowercase()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowFilter {
    criteria: Vec<Criterion>,
}

impl RowFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn with(mut self, criterion: Criterion) -> Self {
        self.criteria.push(criterion);
        self
    }

    /// Exact membership (codes such as ISO3).
    pub fn one_of<S: Into<String>>(
        self,
        column: &str,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        self.with(Criterion::OneOf {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
            case_insensitive: false,
        })
    }

    /// Case-insensitive membership (free-text names).
    pub fn one_of_ignore_case<S: Into<String>>(
        self,
        column: &str,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        self.with(Criterion::OneOf {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
            case_insensitive: true,
        })
    }

    /// Inclusive year bounds. An unbounded range adds nothing.
    pub fn years(self, column: &str, range: YearRange) -> Self {
        if range.is_unbounded() {
            return self;
        }
        self.with(Criterion::YearBetween {
            column: column.into(),
            range,
        })
    }

    pub fn equals_ignore_case(self, column: &str, value: impl Into<String>) -> Self {
        self.with(Criterion::EqualsIgnoreCase {
            column: column.into(),
            value: value.into(),
        })
    }

    /// Rows matching every criterion, in input order.
    ///
    /// Fails with `MissingColumn` if any criterion names a column the table lacks.
    pub fn apply(&self, table: &Table) -> Result<Table> {
        let bound = self
            .criteria
            .iter()
            .map(|c| Ok((table.column_index(c.column())?, c)))
            .collect::<Result<Vec<_>>>()?;
        Ok(table.filter_rows(|row| bound.iter().all(|(i, c)| c.matches(&row[*i]))))
    }
}

impl From<&EventFilter> for RowFilter {
    /// `iso3` (trimmed, exact; an empty list or a lone `"all"` adds nothing), `year`, and the two
    /// case-insensitive hazard columns.
    fn from(f: &EventFilter) -> Self {
        let mut rf = RowFilter::new();
        if let Some(codes) = &f.iso3 {
            let all = match codes.as_slice() {
                [] => true,
                [only] => only.trim().eq_ignore_ascii_case("all"),
                _ => false,
            };
            if !all {
                rf = rf.one_of("iso3", codes.iter().map(|c| c.trim()));
            }
        }
        rf = rf.years("year", f.years);
        if let Some(name) = &f.hazard_category_name {
            rf = rf.equals_ignore_case("hazard_category_name", name.as_str());
        }
        if let Some(name) = &f.hazard_type_name {
            rf = rf.equals_ignore_case("hazard_type_name", name.as_str());
        }
        rf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn sample() -> Table {
        let mut t = Table::new(["iso3", "year", "hazard_category_name"]);
        t.push_row(vec!["TCD".into(), Cell::Int(2010), "Weather related".into()]);
        t.push_row(vec!["SDN".into(), Cell::Null, "Geophysical".into()]);
        t.push_row(vec!["AFG".into(), Cell::Int(2021), "weather related".into()]);
        t
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let t = sample();
        assert_eq!(RowFilter::new().apply(&t).unwrap(), t);
    }

    #[test]
    fn null_year_is_dropped_by_any_bound() {
        let out = RowFilter::new()
            .years("year", YearRange::new(None, Some(2030)))
            .apply(&sample())
            .unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn criteria_combine_as_conjunction() {
        let out = RowFilter::new()
            .equals_ignore_case("hazard_category_name", "WEATHER RELATED")
            .years("year", YearRange::new(Some(2015), None))
            .apply(&sample())
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.get(0, "iso3"), Some(&Cell::from("AFG")));
    }

    #[test]
    fn code_membership_is_case_sensitive() {
        let out = RowFilter::new()
            .one_of("iso3", ["tcd", "SDN"])
            .apply(&sample())
            .unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn lone_all_means_every_country() {
        let f = EventFilter::new().iso3(["all"]);
        assert!(RowFilter::from(&f).is_empty());
        let f = EventFilter::new().iso3([" TCD "]);
        assert_eq!(RowFilter::from(&f).apply(&sample()).unwrap().len(), 1);
    }

    #[test]
    fn empty_iso3_list_is_no_filter() {
        let f = EventFilter::new().iso3(Vec::<String>::new());
        assert!(RowFilter::from(&f).is_empty());
        assert_eq!(RowFilter::from(&f).apply(&sample()).unwrap().len(), 3);
    }

    #[test]
    fn unknown_column_fails_even_on_empty_table() {
        let t = Table::new(["iso3"]);
        let err = RowFilter::new()
            .equals_ignore_case("hazard_type_name", "Flood")
            .apply(&t)
            .unwrap_err();
        assert!(matches!(err, Error::MissingColumn { column } if column == "hazard_type_name"));
    }
}
