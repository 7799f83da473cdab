// Shared test helpers: fixture pages, CSV files and pipeline configs.
//
// This module is included by several test files, so not every helper is used by each.

#![allow(dead_code)]

use std::path::Path;

use table_etl::PipelineConfig;

/// A page with two decoy tables before the GDP table, mirroring the layout of the
/// Wikipedia "largest economies" page (the data table is the third `<table>`).
pub const GDP_HTML: &str = r#"<!DOCTYPE html>
<html><body>
<table class="box"><tr><td>Notice</td></tr></table>
<table class="legend"><tr><td>Legend</td><td>&gt;$20 trillion</td></tr></table>
<table class="wikitable">
  <tr><th>Country</th><th>Region</th><th>IMF estimate</th><th>Year</th></tr>
  <tr><th></th><th></th><th>Estimate</th><th>Year</th></tr>
  <tr><td>World</td><td>—</td><td>104,476,432</td><td>2023</td></tr>
  <tr><td><span class="flag"></span> <a href="/us">United States</a></td><td>North America</td><td>26,854,599</td><td>2023</td></tr>
  <tr><td><span class="flag"></span> <a href="/cn">China</a></td><td>Asia</td><td>19,373,586</td><td>2023</td></tr>
  <tr><td><span class="flag"></span> <a href="/ru">Russia</a></td><td>Europe</td><td>—</td><td>—</td></tr>
  <tr><td><span class="flag"></span> <a href="/de">Germany</a></td><td>Europe</td><td>4,309,982</td><td>2023</td></tr>
  <tr><td><span class="flag"></span> <a href="/tv">Tuvalu</a></td><td>Oceania</td><td>63</td><td>2023</td></tr>
</table>
</body></html>"#;

pub const INSTRUCTOR_CSV: &str = "1,Rav,Ahuja,TORONTO,CA\n\
2,Raul,Chong,Markham,CA\n\
3,Hima,Vasudevan,Chicago,US\n";

pub const EXCHANGE_RATES_CSV: &str = "Currency,Rate\nEUR,0.93\nGBP,0.8\nINR,82.95\n";

/// Writes `content` to `dir/name` and returns the full path as a string.
pub fn write_file(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("Failed to write fixture");
    path.display().to_string()
}

/// GDP pipeline reading a saved page from `dir`.
pub fn gdp_config(dir: &Path) -> PipelineConfig {
    PipelineConfig::from_toml_str(&gdp_toml(dir)).expect("valid GDP config")
}

/// Writes the GDP fixture page into `dir` and returns the pipeline TOML for it.
pub fn gdp_toml(dir: &Path) -> String {
    let page = write_file(dir, "gdp.html", GDP_HTML);
    format!(
        r#"
        table_name = "Countries_by_GDP"
        output_csv = "{dir}/Countries_by_GDP.csv"
        db_path = "{dir}/World_Economies.db"
        log_file = "{dir}/etl_project_log.txt"
        locator = {{ index = 2 }}
        skip_rows = 2
        queries = ["SELECT * FROM Countries_by_GDP WHERE GDP_USD_billions >= 100"]

        [source]
        kind = "html_file"
        path = "{page}"

        [[columns]]
        name = "Country"
        cell = 0
        rule = {{ nested = "a" }}

        [[columns]]
        name = "GDP_USD_billions"
        cell = 2

        # The page lists millions; store billions.
        [[transform]]
        step = "scale"
        source = "GDP_USD_billions"
        target = "GDP_USD_billions"
        factor = 0.001
        "#,
        dir = dir.display()
    )
}

/// Staff pipeline: header-less CSV into the INSTRUCTOR table plus one literal row.
pub fn staff_config(dir: &Path) -> PipelineConfig {
    PipelineConfig::from_toml_str(&staff_toml(dir)).expect("valid staff config")
}

/// Writes the INSTRUCTOR fixture into `dir` and returns the pipeline TOML for it.
pub fn staff_toml(dir: &Path) -> String {
    let csv = write_file(dir, "INSTRUCTOR.csv", INSTRUCTOR_CSV);
    format!(
        r#"
        table_name = "INSTRUCTOR"
        output_csv = "{dir}/INSTRUCTOR_out.csv"
        db_path = "{dir}/STAFF.db"
        log_file = "{dir}/code_log.txt"
        append_rows = [[100, "John", "Doe", "Paris", "FR"]]
        queries = [
            "SELECT * FROM INSTRUCTOR",
            "SELECT FNAME FROM INSTRUCTOR",
            "SELECT COUNT(*) FROM INSTRUCTOR",
        ]

        [source]
        kind = "csv_file"
        path = "{csv}"

        [[columns]]
        name = "ID"
        kind = "integer"

        [[columns]]
        name = "FNAME"

        [[columns]]
        name = "LNAME"

        [[columns]]
        name = "CITY"

        [[columns]]
        name = "CCODE"
        "#,
        dir = dir.display()
    )
}

/// Reads the progress log and returns just the messages.
pub fn progress_messages(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .expect("Failed to read progress log")
        .lines()
        .map(|line| {
            line.split_once(',')
                .map(|(_, message)| message.to_string())
                .expect("progress line has a timestamp")
        })
        .collect()
}
