use crate::core::archetype::UsageClass;
use crate::core::units::{DAYS_PER_YEAR, HOURS_PER_DAY};
use crate::errors::ConfigurationError;
use crate::simulation_time::{HourOfYear, HOURS_IN_YEAR};
use anyhow::Context;
use itertools::Itertools;
use std::io::Read;

// Default daily profiles, applied uniformly across the year when no
// schedule file is provided for a usage class.
const RESIDENTIAL_OCCUPANCY: [f64; 24] = [
    1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.8, 0.6, 0.4, 0.4, 0.4, 0.4, 0.4, 0.4, 0.5, 0.6, 0.8,
    0.9, 1.0, 1.0, 1.0, 1.0, 1.0,
];
const RESIDENTIAL_LIGHTING: [f64; 24] = [
    0.1, 0.1, 0.1, 0.1, 0.1, 0.2, 0.5, 0.6, 0.3, 0.2, 0.2, 0.2, 0.2, 0.2, 0.2, 0.2, 0.4, 0.7,
    0.9, 1.0, 1.0, 0.8, 0.5, 0.2,
];
const RESIDENTIAL_EQUIPMENT: [f64; 24] = [
    0.3, 0.3, 0.3, 0.3, 0.3, 0.3, 0.5, 0.7, 0.5, 0.4, 0.4, 0.4, 0.4, 0.4, 0.4, 0.5, 0.6, 0.8,
    0.9, 0.9, 0.8, 0.6, 0.5, 0.4,
];
const COMMERCIAL_OCCUPANCY: [f64; 24] = [
    0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.1, 0.4, 0.8, 1.0, 1.0, 1.0, 0.8, 1.0, 1.0, 1.0, 0.8, 0.5,
    0.2, 0.1, 0.0, 0.0, 0.0, 0.0,
];
const COMMERCIAL_LIGHTING: [f64; 24] = [
    0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.3, 0.6, 0.9, 1.0, 1.0, 1.0, 0.9, 1.0, 1.0, 1.0, 0.9, 0.6,
    0.4, 0.2, 0.1, 0.1, 0.1, 0.1,
];
const COMMERCIAL_EQUIPMENT: [f64; 24] = [
    0.2, 0.2, 0.2, 0.2, 0.2, 0.2, 0.3, 0.6, 0.9, 1.0, 1.0, 1.0, 0.9, 1.0, 1.0, 1.0, 0.8, 0.5,
    0.3, 0.2, 0.2, 0.2, 0.2, 0.2,
];

/// A normalized hourly fraction series spanning the whole year. Every value
/// is in [0, 1].
#[derive(Clone, Debug)]
pub struct FractionSchedule {
    fractions: Vec<f64>,
}

impl FractionSchedule {
    pub fn from_hourly(
        name: &'static str,
        fractions: Vec<f64>,
    ) -> Result<Self, ConfigurationError> {
        if fractions.len() != HOURS_IN_YEAR as usize {
            return Err(ConfigurationError::ScheduleLength {
                name,
                actual: fractions.len(),
                expected: HOURS_IN_YEAR as usize,
            });
        }
        if let Some(&value) = fractions.iter().find(|f| !(0.0..=1.0).contains(*f)) {
            return Err(ConfigurationError::ScheduleFractionOutOfRange { name, value });
        }
        Ok(Self { fractions })
    }

    /// Expand a 24-hour daily profile to the full year by tiling it across
    /// every day.
    pub fn from_daily_profile(profile: &[f64; HOURS_PER_DAY as usize]) -> Self {
        let mut fractions = Vec::with_capacity(HOURS_IN_YEAR as usize);
        for _ in 0..DAYS_PER_YEAR {
            fractions.extend_from_slice(profile);
        }
        Self { fractions }
    }

    pub fn fraction(&self, hour: HourOfYear) -> f64 {
        self.fractions[hour.index()]
    }
}

/// The three fraction schedules driving internal gains for one usage class.
#[derive(Clone, Debug)]
pub struct UsageSchedules {
    pub occupancy: FractionSchedule,
    pub lighting: FractionSchedule,
    pub equipment: FractionSchedule,
}

impl UsageSchedules {
    /// Read schedules from tabular storage: a CSV file with a header row
    /// and three fraction columns (occupancy, lighting, equipment), one row
    /// per hour of the year.
    pub fn from_csv(reader: impl Read) -> anyhow::Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let rows = csv_reader
            .records()
            .enumerate()
            .map(|(i, record)| {
                let record = record.with_context(|| format!("malformed schedule row {i}"))?;
                Ok((
                    parse_fraction(&record, 0, i)?,
                    parse_fraction(&record, 1, i)?,
                    parse_fraction(&record, 2, i)?,
                ))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        let (occupancy, lighting, equipment): (Vec<f64>, Vec<f64>, Vec<f64>) =
            rows.into_iter().multiunzip();

        Ok(Self {
            occupancy: FractionSchedule::from_hourly("occupancy", occupancy)?,
            lighting: FractionSchedule::from_hourly("lighting", lighting)?,
            equipment: FractionSchedule::from_hourly("equipment", equipment)?,
        })
    }

    /// Built-in daily profiles for a usage class, tiled across the year.
    pub fn default_for(usage: UsageClass) -> Self {
        let (occupancy, lighting, equipment) = match usage {
            UsageClass::Residential => (
                &RESIDENTIAL_OCCUPANCY,
                &RESIDENTIAL_LIGHTING,
                &RESIDENTIAL_EQUIPMENT,
            ),
            UsageClass::Commercial => (
                &COMMERCIAL_OCCUPANCY,
                &COMMERCIAL_LIGHTING,
                &COMMERCIAL_EQUIPMENT,
            ),
        };
        Self {
            occupancy: FractionSchedule::from_daily_profile(occupancy),
            lighting: FractionSchedule::from_daily_profile(lighting),
            equipment: FractionSchedule::from_daily_profile(equipment),
        }
    }
}

fn parse_fraction(record: &csv::StringRecord, column: usize, row: usize) -> anyhow::Result<f64> {
    record
        .get(column)
        .with_context(|| format!("schedule row {row} has no column {column}"))?
        .trim()
        .parse()
        .with_context(|| format!("schedule row {row}, column {column} is not numeric"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::*;

    #[rstest]
    fn daily_profile_tiles_across_the_year() {
        let schedule = FractionSchedule::from_daily_profile(&RESIDENTIAL_OCCUPANCY);
        let midnight_day_one = HourOfYear::new(0).unwrap();
        let midnight_day_two = HourOfYear::new(24).unwrap();
        assert_relative_eq!(
            schedule.fraction(midnight_day_one),
            schedule.fraction(midnight_day_two)
        );
        let ten_am = HourOfYear::new(10).unwrap();
        assert_relative_eq!(schedule.fraction(ten_am), 0.4);
    }

    #[rstest]
    fn hourly_schedule_of_wrong_length_is_rejected() {
        let result = FractionSchedule::from_hourly("occupancy", vec![0.5; 24]);
        assert!(matches!(
            result,
            Err(ConfigurationError::ScheduleLength {
                name: "occupancy",
                actual: 24,
                ..
            })
        ));
    }

    #[rstest]
    fn out_of_range_fraction_is_rejected() {
        let mut fractions = vec![0.5; 8760];
        fractions[100] = 1.5;
        let result = FractionSchedule::from_hourly("lighting", fractions);
        assert!(matches!(
            result,
            Err(ConfigurationError::ScheduleFractionOutOfRange {
                name: "lighting",
                ..
            })
        ));
    }

    #[rstest]
    fn csv_round_trip() {
        let mut csv = String::from("occupancy,lighting,equipment\n");
        for hour in 0..8760 {
            let fraction = if hour % 2 == 0 { 0.25 } else { 0.75 };
            csv.push_str(&format!("{fraction},{fraction},{fraction}\n"));
        }
        let schedules = UsageSchedules::from_csv(csv.as_bytes()).unwrap();
        assert_relative_eq!(
            schedules.occupancy.fraction(HourOfYear::new(0).unwrap()),
            0.25
        );
        assert_relative_eq!(
            schedules.equipment.fraction(HourOfYear::new(1).unwrap()),
            0.75
        );
    }

    #[rstest]
    fn default_commercial_schedules_are_empty_overnight() {
        let schedules = UsageSchedules::default_for(UsageClass::Commercial);
        let two_am = HourOfYear::new(2).unwrap();
        assert_relative_eq!(schedules.occupancy.fraction(two_am), 0.0);
        let ten_am = HourOfYear::new(10).unwrap();
        assert_relative_eq!(schedules.occupancy.fraction(ten_am), 1.0);
    }
}
