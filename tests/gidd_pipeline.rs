mod common;

use common::FakeHttp;
use dispdata::gidd::{GiddClient, GiddQuery, get_data_gidd};
use dispdata::{Cell, Error, EventFilter, IndicatorMap, YearRange};
use reqwest::StatusCode;
use serde_json::json;

const BASE: &str = "http://gidd.test/disasters/";
const FIRST: &str = "http://gidd.test/disasters/?client_id=KEY&limit=2";
const SECOND: &str = "http://gidd.test/disasters/?client_id=KEY&limit=2&offset=2";

fn page_one() -> serde_json::Value {
    json!({
        "count": 3,
        "next": SECOND,
        "results": [
            {"ISO3": "SDN", "Year": 2019, "Start Date": "2019-09-03", "Event Name": "Sudan floods",
             "Hazard Category Name": "Weather related", "Hazard Type Name": "Flood", "New Displacement": 800},
            {"ISO3": "TCD", "Year": "2020", "Start Date": "2020-08-01", "Event Name": "Chad floods",
             "Hazard Category Name": "weather related", "Hazard Type Name": "Flood", "New Displacement": 1200}
        ]
    })
}

fn page_two() -> serde_json::Value {
    json!({
        "count": 3,
        "next": null,
        "results": [
            {"ISO3": "AFG", "Year": "n/a", "Start Date": "2022-06-22", "Event Name": "Paktika earthquake",
             "Hazard Category Name": "Geophysical", "Hazard Type Name": "Earthquake", "New Displacement": 150}
        ]
    })
}

fn client() -> GiddClient<FakeHttp> {
    let http = FakeHttp::new().with(FIRST, page_one()).with(SECOND, page_two());
    GiddClient::new(http).with_base_url(BASE)
}

#[test]
fn pages_are_concatenated_in_order() {
    let c = client();
    let t = get_data_gidd(&c, &GiddQuery::new("KEY").limit(2)).unwrap();
    assert_eq!(t.len(), 3);
    let iso3: Vec<_> = t.column("iso3").unwrap().into_iter().cloned().collect();
    assert_eq!(iso3, [Cell::from("SDN"), Cell::from("TCD"), Cell::from("AFG")]);
    assert_eq!(&t.columns()[..3], ["iso3", "year", "start_date"]);
}

#[test]
fn follows_next_url_verbatim() {
    let http = FakeHttp::new().with(FIRST, page_one()).with(SECOND, page_two());
    let c = GiddClient::new(&http).with_base_url(BASE);
    c.fetch_all("KEY", 2).unwrap();
    assert_eq!(http.calls(), [FIRST, SECOND]);
}

#[test]
fn year_is_coerced_to_nullable_integer() {
    let t = get_data_gidd(&client(), &GiddQuery::new("KEY").limit(2)).unwrap();
    let years: Vec<_> = t.column("year").unwrap().into_iter().cloned().collect();
    assert_eq!(years, [Cell::Int(2019), Cell::Int(2020), Cell::Null]);
}

#[test]
fn filters_and_indicator_selection() {
    let ind: IndicatorMap = [("new_displacement", "New displacements")]
        .into_iter()
        .collect();
    let q = GiddQuery::new("KEY")
        .limit(2)
        .filter(
            EventFilter::new()
                .iso3(["SDN", "TCD"])
                .years(YearRange::new(Some(2020), Some(2020)))
                .hazard_category("WEATHER RELATED"),
        )
        .indicators(ind);
    let t = get_data_gidd(&client(), &q).unwrap();
    assert_eq!(
        t.columns(),
        ["iso3", "year", "start_date", "New displacements"]
    );
    assert_eq!(t.len(), 1);
    assert_eq!(t.get(0, "New displacements"), Some(&Cell::Int(1200)));
}

#[test]
fn iso3_all_keeps_everything() {
    let q = GiddQuery::new("KEY")
        .limit(2)
        .filter(EventFilter::new().iso3(["all"]));
    assert_eq!(get_data_gidd(&client(), &q).unwrap().len(), 3);
}

#[test]
fn failed_page_discards_everything() {
    let http = FakeHttp::new()
        .with(FIRST, page_one())
        .with_status(SECOND, StatusCode::INTERNAL_SERVER_ERROR);
    let c = GiddClient::new(&http).with_base_url(BASE);
    let err = get_data_gidd(&c, &GiddQuery::new("KEY").limit(2)).unwrap_err();
    assert!(matches!(
        err,
        Error::HttpStatus { status, .. } if status == StatusCode::INTERNAL_SERVER_ERROR
    ));
    // no retry
    assert_eq!(http.calls().len(), 2);
}

#[test]
fn default_limit_is_500() {
    let http = FakeHttp::new().with(
        "http://gidd.test/disasters/?client_id=KEY&limit=500",
        json!({"results": [{"iso3": "SDN", "year": 2019, "start_date": "2019-09-03"}], "next": null}),
    );
    let c = GiddClient::new(&http).with_base_url(BASE);
    let t = get_data_gidd(&c, &GiddQuery::new("KEY")).unwrap();
    assert_eq!(t.len(), 1);
}
