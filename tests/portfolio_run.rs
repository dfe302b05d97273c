//! Full-pipeline run through `run_portfolio`: JSON ingest, simulation and
//! the three CSV output tables.

use std::fs;
use std::path::PathBuf;
use ubem::output::FileOutput;
use ubem::portfolio::{EngineConfig, ScheduleLibrary};
use ubem::read_weather_file::WeatherData;
use ubem::run_portfolio;

const HOURS: usize = 8760;

fn portfolio_json() -> String {
    let faces = r#"[
        {"normal": [0.0, 0.0, -1.0], "area": 100.0},
        {"normal": [0.0, 0.0, 1.0], "area": 100.0},
        {"normal": [1.0, 0.0, 0.0], "area": 60.0},
        {"normal": [0.0, 1.0, 0.0], "area": 60.0},
        {"normal": [-1.0, 0.0, 0.0], "area": 60.0},
        {"normal": [0.0, -1.0, 0.0], "area": 60.0}
    ]"#;
    format!(
        r#"{{
            "buildings": [
                {{
                    "id": "dwelling",
                    "usage": "residential",
                    "construction_year": 1945,
                    "region": "DK",
                    "height": 6.0,
                    "faces": {faces}
                }},
                {{
                    "id": "orphan",
                    "usage": "commercial",
                    "construction_year": 2020,
                    "region": "US_5A",
                    "height": 9.0,
                    "faces": {faces}
                }}
            ]
        }}"#
    )
}

fn archetype_json() -> &'static str {
    // covers only the residential building; the commercial key is missing
    r#"{
        "archetypes": [
            {
                "name": "RES_1_1931_1950_DK",
                "description": "Residential building built in 1931-1950 in DK.",
                "constructions": {
                    "floor": {"Uvalue": 0.3, "k_m": 120000.0},
                    "walls": {"Uvalue": 0.5, "k_m": 140000.0},
                    "roof": {"Uvalue": 0.3, "k_m": 100000.0},
                    "window": {"Uvalue": 1.5, "k_m": 0.0, "g-factor": 0.6, "wwr": 0.2}
                }
            }
        ]
    }"#
}

fn mild_weather() -> WeatherData {
    WeatherData {
        air_temperatures: vec![5.0; HOURS],
        direct_normal_radiation: vec![0.0; HOURS],
        diffuse_horizontal_radiation: vec![0.0; HOURS],
        global_horizontal_radiation: vec![0.0; HOURS],
        latitude: 55.6,
        longitude: 12.6,
        timezone: 1.0,
    }
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ubem-test-{name}-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn writes_series_aggregate_and_static_tables_and_skips_failed_buildings() {
    let dir = scratch_dir("tables");
    let output = FileOutput::new(dir.clone(), "{}.csv".to_string());

    let summary = run_portfolio(
        portfolio_json().as_bytes(),
        archetype_json().as_bytes(),
        mild_weather(),
        ScheduleLibrary::default(),
        EngineConfig::default(),
        output,
    )
    .unwrap();

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);

    let series = fs::read_to_string(dir.join("dwelling_results.csv")).unwrap();
    let mut lines = series.lines();
    assert_eq!(
        lines.next().unwrap(),
        "hour,indoor air temp [deg C],net load [W]"
    );
    assert_eq!(lines.count(), HOURS);
    // the failed building produced no series file
    assert!(!dir.join("orphan_results.csv").exists());

    let aggregated = fs::read_to_string(dir.join("results_loads.csv")).unwrap();
    let mut lines = aggregated.lines();
    assert_eq!(lines.next().unwrap(), "hour,dwelling");
    assert_eq!(lines.count(), HOURS);

    let summary_table = fs::read_to_string(dir.join("results_static.csv")).unwrap();
    let mut lines = summary_table.lines();
    assert_eq!(
        lines.next().unwrap(),
        "building id,floor area [m2],total heat capacity [J/K],floor U-value [W/(m2.K)]"
    );
    let row = lines.next().unwrap();
    assert!(row.starts_with("dwelling,200,"));

    fs::remove_dir_all(dir).unwrap();
}
