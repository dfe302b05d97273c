extern crate ubem;

use clap::Parser;
use std::fs::{create_dir_all, File};
use std::io::BufReader;
use std::path::PathBuf;
use ubem::core::schedule::UsageSchedules;
use ubem::output::FileOutput;
use ubem::portfolio::{EngineConfig, ScheduleLibrary};
use ubem::read_weather_file::weather_data_from_epw;
use ubem::run_portfolio;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct UbemArgs {
    /// Portfolio JSON file describing the buildings to simulate
    portfolio_file: String,
    /// Archetype reference table (JSON)
    #[arg(long, short)]
    archetypes_file: String,
    /// EPW weather file for the representative year
    #[arg(long, short)]
    epw_file: String,
    /// Directory to write result CSV files into
    #[arg(long, short, default_value = ".")]
    output_dir: PathBuf,
    /// Residential schedule CSV (occupancy,lighting,equipment fractions,
    /// one row per hour); built-in daily profiles are used when omitted
    #[arg(long)]
    residential_schedules: Option<String>,
    /// Commercial schedule CSV, as for --residential-schedules
    #[arg(long)]
    commercial_schedules: Option<String>,
    /// Heating setpoint in deg C
    #[arg(long)]
    heating_setpoint: Option<f64>,
    /// Cooling setpoint in deg C
    #[arg(long)]
    cooling_setpoint: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = UbemArgs::parse();

    let weather_data =
        weather_data_from_epw(BufReader::new(File::open(&args.epw_file)?))?;

    let schedules = ScheduleLibrary::new(
        schedules_from_file(args.residential_schedules.as_deref())?,
        schedules_from_file(args.commercial_schedules.as_deref())?,
    );

    let mut config = EngineConfig::default();
    if let Some(setpoint) = args.heating_setpoint {
        config.thermal.heating_setpoint = setpoint;
    }
    if let Some(setpoint) = args.cooling_setpoint {
        config.thermal.cooling_setpoint = setpoint;
    }

    create_dir_all(&args.output_dir)?;
    let output = FileOutput::new(args.output_dir, "{}.csv".to_string());

    let summary = run_portfolio(
        BufReader::new(File::open(&args.portfolio_file)?),
        BufReader::new(File::open(&args.archetypes_file)?),
        weather_data,
        schedules,
        config,
        output,
    )?;

    println!(
        "simulated {} buildings, {} failed",
        summary.succeeded, summary.failed
    );

    Ok(())
}

fn schedules_from_file(path: Option<&str>) -> anyhow::Result<Option<UsageSchedules>> {
    match path {
        Some(path) => {
            let file = File::open(path)?;
            Ok(Some(UsageSchedules::from_csv(BufReader::new(file))?))
        }
        None => Ok(None),
    }
}
