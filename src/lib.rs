pub mod core;
pub mod errors;
pub mod external_conditions;
pub mod input;
pub mod output;
pub mod portfolio;
pub mod read_weather_file;
pub mod simulation_time;

use crate::core::archetype::ArchetypeStore;
use crate::external_conditions::ExternalConditions;
use crate::input::ingest_portfolio;
use crate::output::Output;
use crate::portfolio::{BuildingResult, EngineConfig, Portfolio, ScheduleLibrary};
use crate::read_weather_file::WeatherData;
use crate::simulation_time::HOURS_IN_YEAR;
use csv::WriterBuilder;
use std::io::Read;

/// Counts for one completed run: buildings simulated to the end versus
/// buildings skipped after a per-building error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Run the full pipeline over a portfolio: ingest buildings and the
/// archetype table, build the shared climate context from weather data,
/// simulate every building, and write the result tables to `output`.
///
/// Three tables are produced: a per-building series file
/// (`<id>_results.csv`) with hourly indoor temperature and net load, an
/// aggregated per-run load table (`results_loads.csv`) with an hour-index
/// column and one column per building, and a static summary
/// (`results_static.csv`) with each building's floor area, total heat
/// capacity and floor U-value.
pub fn run_portfolio(
    portfolio_input: impl Read,
    archetype_input: impl Read,
    weather_data: WeatherData,
    schedules: ScheduleLibrary,
    config: EngineConfig,
    output: impl Output,
) -> anyhow::Result<RunSummary> {
    let portfolio_input = ingest_portfolio(portfolio_input)?;
    let archetypes = ArchetypeStore::from_reader(archetype_input)?;
    let conditions = ExternalConditions::new(
        weather_data.air_temperatures,
        weather_data.direct_normal_radiation,
        weather_data.diffuse_horizontal_radiation,
        weather_data.global_horizontal_radiation,
        weather_data.latitude,
        weather_data.longitude,
        weather_data.timezone,
        config.solar.ground_albedo,
    )?;

    let portfolio = Portfolio::new(portfolio_input, archetypes, conditions, schedules, config);
    let outcomes = portfolio.run();

    let results: Vec<&BuildingResult> = outcomes
        .iter()
        .filter_map(|outcome| outcome.as_ref().ok())
        .collect();
    let failed = outcomes.len() - results.len();

    if !output.is_noop() {
        for result in &results {
            write_building_series(&output, result)?;
        }
        write_aggregated_loads(&output, &results)?;
        write_static_summary(&output, &results)?;
    }

    Ok(RunSummary {
        succeeded: results.len(),
        failed,
    })
}

fn write_building_series(output: &impl Output, result: &BuildingResult) -> anyhow::Result<()> {
    let location_key = format!("{}_results", result.building_id);
    let writer = output.writer_for_location_key(&location_key)?;
    let mut writer = WriterBuilder::new().from_writer(writer);

    writer.write_record(["hour", "indoor air temp [deg C]", "net load [W]"])?;
    for (hour, load) in result.loads.hours.iter().enumerate() {
        writer.write_record(&[
            hour.to_string(),
            load.indoor_temperature.to_string(),
            load.net_load.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn write_aggregated_loads(
    output: &impl Output,
    results: &[&BuildingResult],
) -> anyhow::Result<()> {
    let writer = output.writer_for_location_key("results_loads")?;
    let mut writer = WriterBuilder::new().from_writer(writer);

    let mut headings = vec!["hour".to_string()];
    headings.extend(results.iter().map(|result| result.building_id.clone()));
    writer.write_record(&headings)?;

    for hour in 0..HOURS_IN_YEAR as usize {
        let mut row = vec![hour.to_string()];
        row.extend(
            results
                .iter()
                .map(|result| result.loads.hours[hour].net_load.to_string()),
        );
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

fn write_static_summary(output: &impl Output, results: &[&BuildingResult]) -> anyhow::Result<()> {
    let writer = output.writer_for_location_key("results_static")?;
    let mut writer = WriterBuilder::new().from_writer(writer);

    writer.write_record([
        "building id",
        "floor area [m2]",
        "total heat capacity [J/K]",
        "floor U-value [W/(m2.K)]",
    ])?;
    for result in results {
        writer.write_record(&[
            result.building_id.clone(),
            result.floor_area.to_string(),
            result.total_heat_capacity.to_string(),
            result.floor_u_value.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
