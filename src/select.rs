use crate::error::Result;
use crate::models::IndicatorSpec;
use crate::table::Table;

/// Keep `base` columns followed by the indicator columns named by `spec`.
///
/// With [`IndicatorSpec::AllColumns`] every non-base column follows in table order.
/// With [`IndicatorSpec::Selected`] each code follows in map order, renamed to its
/// display name. A base column or code missing from the table is an error.
pub fn select_indicators(table: &Table, base: &[&str], spec: &IndicatorSpec) -> Result<Table> {
    let mut cols: Vec<(&str, &str)> = base.iter().map(|c| (*c, *c)).collect();
    match spec {
        IndicatorSpec::AllColumns => cols.extend(
            table
                .columns()
                .iter()
                .map(String::as_str)
                .filter(|c| !base.contains(c))
                .map(|c| (c, c)),
        ),
        IndicatorSpec::Selected(map) => cols.extend(map.iter()),
    }
    table.project(&cols)
}
