use crate::core::archetype::UsageClass;
use crate::core::schedule::UsageSchedules;
use crate::simulation_time::{annual_hours, HourOfYear};

/// Per-usage-class gain intensities.
#[derive(Clone, Copy, Debug)]
pub struct GainIntensity {
    /// Floor area per occupant, in m2/person.
    pub area_per_person: f64,
    /// Sensible heat emitted per occupant, in W/person.
    pub heat_per_person: f64,
    /// Installed lighting power density, in W/m2.
    pub lighting_density: f64,
    /// Installed equipment power density, in W/m2.
    pub equipment_density: f64,
}

impl GainIntensity {
    pub fn for_usage(usage: UsageClass) -> Self {
        match usage {
            UsageClass::Residential => Self {
                area_per_person: 28.0,
                heat_per_person: 70.0,
                lighting_density: 3.0,
                equipment_density: 4.0,
            },
            UsageClass::Commercial => Self {
                area_per_person: 12.0,
                heat_per_person: 80.0,
                lighting_density: 8.0,
                equipment_density: 10.0,
            },
        }
    }
}

/// Hourly internal heat gains for one building, in W.
#[derive(Clone, Debug)]
pub struct InternalGains {
    series: Vec<f64>,
}

impl InternalGains {
    /// Build the annual gain series from the usage-class intensities, the
    /// building floor area and the three fraction schedules:
    /// occupants scaled by floor area over area-per-person, plus lighting
    /// and equipment power densities scaled by floor area.
    pub fn build(usage: UsageClass, floor_area: f64, schedules: &UsageSchedules) -> Self {
        let intensity = GainIntensity::for_usage(usage);
        let occupant_gain_at_full_presence =
            intensity.heat_per_person * floor_area / intensity.area_per_person;

        let series = annual_hours()
            .map(|hour| {
                schedules.occupancy.fraction(hour) * occupant_gain_at_full_presence
                    + schedules.lighting.fraction(hour) * intensity.lighting_density * floor_area
                    + schedules.equipment.fraction(hour) * intensity.equipment_density * floor_area
            })
            .collect();

        Self { series }
    }

    /// An all-zero gain series, for buildings simulated without occupancy.
    pub fn zero() -> Self {
        Self {
            series: vec![0.0; crate::simulation_time::HOURS_IN_YEAR as usize],
        }
    }

    pub fn gain_w(&self, hour: HourOfYear) -> f64 {
        self.series[hour.index()]
    }

    pub fn series(&self) -> &[f64] {
        &self.series
    }
}
