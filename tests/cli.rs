mod common;

use assert_cmd::prelude::*;
use common::csv_file;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("dispdata").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("dispdata"))
        .stdout(predicate::str::contains("gidd"));
}

#[test]
fn hdi_to_stdout() {
    let (_dir, path) = csv_file(b"iso3,country,region,hdi_1990,hdi_2000\nTCD,Chad,SSA,0.3,0.29\n");
    let mut cmd = Command::cargo_bin("dispdata").unwrap();
    cmd.args(["hdi", "--file"])
        .arg(&path)
        .args(["--indicators", "hdi=Human Development Index", "--start", "2000"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "iso3,country,region,metric,metric_name,year,value",
        ))
        .stdout(predicate::str::contains(
            "TCD,Chad,SSA,hdi,Human Development Index,2000,0.29",
        ))
        .stdout(predicate::str::contains("1990").not());
}

#[test]
fn idmc_to_json_file() {
    let (dir, path) = csv_file(
        b"ISO3,Year,Start Date,Hazard Type Name,New Displacement\n\
          TCD,2019,2019-08-01,Flood,1200\n\
          SDN,2020,2020-08-20,Flood,300\n",
    );
    let out = dir.path().join("out.json");
    let mut cmd = Command::cargo_bin("dispdata").unwrap();
    cmd.args(["idmc", "--file"])
        .arg(&path)
        .args(["--iso3", "SDN", "--hazard-type", "FLOOD", "--out"])
        .arg(&out);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Saved 1 rows"));
    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(v[0]["iso3"], "SDN");
    assert_eq!(v[0]["new_displacement"], 300);
}

#[test]
fn gidd_requires_client_id() {
    let mut cmd = Command::cargo_bin("dispdata").unwrap();
    cmd.env_remove("GIDD_CLIENT_ID").arg("gidd");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--client-id"));
}

#[test]
fn indicator_names_may_contain_commas() {
    let (_dir, path) = csv_file(b"iso3,country,region,le_2000,hdi_2000\nTCD,Chad,SSA,48.5,0.29\n");
    let mut cmd = Command::cargo_bin("dispdata").unwrap();
    cmd.args(["hdi", "--file"])
        .arg(&path)
        .args(["--indicator", "le=Life expectancy, at birth"])
        .args(["--indicator", "hdi=HDI"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "TCD,Chad,SSA,le,\"Life expectancy, at birth\",2000,48.5",
        ))
        .stdout(predicate::str::contains("TCD,Chad,SSA,hdi,HDI,2000,0.29"));
}
