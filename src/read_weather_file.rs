use anyhow::{anyhow, Context};
use csv::ReaderBuilder as CsvReaderBuilder;
use std::io::Read;

// EPW location header fields
const COLUMN_LATITUDE: usize = 6;
const COLUMN_LONGITUDE: usize = 7;
const COLUMN_TIMEZONE: usize = 8; // offset from UTC in hours

// EPW data record fields
const COLUMN_AIR_TEMP: usize = 6; // dry bulb temp in degrees
const COLUMN_GLOBAL_RAD: usize = 13; // global horizontal irradiation in Wh/m2
const COLUMN_DNI_RAD: usize = 14; // direct beam normal irradiation in Wh/m2
const COLUMN_DIF_RAD: usize = 15; // diffuse irradiation (horizontal plane) in Wh/m2

// EPW files carry 8 header rows before the first data record
const DATA_START_ROW: usize = 8;

/// Raw weather series read from an EPW file, one entry per hour, together
/// with the station metadata needed to locate the sun.
#[derive(Clone, Debug)]
pub struct WeatherData {
    pub air_temperatures: Vec<f64>,
    pub direct_normal_radiation: Vec<f64>,
    pub diffuse_horizontal_radiation: Vec<f64>,
    pub global_horizontal_radiation: Vec<f64>,
    pub latitude: f64,
    pub longitude: f64,
    /// Timezone offset from UTC in hours, from the EPW location row.
    pub timezone: f64,
}

pub fn weather_data_from_epw(file: impl Read) -> anyhow::Result<WeatherData> {
    let mut reader = CsvReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_reader(file);

    let mut air_temperatures = vec![];
    let mut direct_normal_radiation = vec![];
    let mut diffuse_horizontal_radiation = vec![];
    let mut global_horizontal_radiation = vec![];
    let mut latitude: Option<f64> = None;
    let mut longitude: Option<f64> = None;
    let mut timezone: Option<f64> = None;

    for (i, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("malformed EPW record at row {i}"))?;
        if i == 0 {
            latitude = Some(parse_field(&record, COLUMN_LATITUDE, i)?);
            longitude = Some(parse_field(&record, COLUMN_LONGITUDE, i)?);
            timezone = Some(parse_field(&record, COLUMN_TIMEZONE, i)?);
        } else if i >= DATA_START_ROW {
            air_temperatures.push(parse_field(&record, COLUMN_AIR_TEMP, i)?);
            global_horizontal_radiation.push(parse_field(&record, COLUMN_GLOBAL_RAD, i)?);
            direct_normal_radiation.push(parse_field(&record, COLUMN_DNI_RAD, i)?);
            diffuse_horizontal_radiation.push(parse_field(&record, COLUMN_DIF_RAD, i)?);
        }
    }

    Ok(WeatherData {
        air_temperatures,
        direct_normal_radiation,
        diffuse_horizontal_radiation,
        global_horizontal_radiation,
        latitude: latitude.ok_or_else(|| anyhow!("EPW file has no location row"))?,
        longitude: longitude.ok_or_else(|| anyhow!("EPW file has no location row"))?,
        timezone: timezone.ok_or_else(|| anyhow!("EPW file has no location row"))?,
    })
}

fn parse_field(record: &csv::StringRecord, column: usize, row: usize) -> anyhow::Result<f64> {
    record
        .get(column)
        .ok_or_else(|| anyhow!("EPW row {row} has no column {column}"))?
        .trim()
        .parse()
        .with_context(|| format!("EPW row {row}, column {column} is not numeric"))
}
