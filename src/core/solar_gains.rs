use crate::core::archetype::EnvelopeConstructions;
use crate::core::geometry::SurfaceAreaProfile;
use crate::external_conditions::ExternalConditions;
use crate::simulation_time::{annual_hours, HourOfYear};

// Long-wave radiative exchange with the sky. The radiative coefficient is
// per unit surface emissivity; the sky temperature difference is the
// assumed average depression of the apparent sky temperature below the
// external air temperature. Walls see half the sky dome, the flat roof all
// of it.
const RADIATIVE_COEFFICIENT_PER_EMISSIVITY: f64 = 5.0; // W/(m2.K)
const SKY_TEMPERATURE_DIFFERENCE: f64 = 11.0; // K
const WALL_SKY_VIEW_FRACTION: f64 = 0.5;
const ROOF_SKY_VIEW_FRACTION: f64 = 1.0;

const WALL_TILT: f64 = 90.0;
const ROOF_TILT: f64 = 0.0;
const ROOF_AZIMUTH: f64 = 0.0;

#[derive(Clone, Copy, Debug)]
pub struct SolarConfig {
    /// Solar absorptance of opaque external surfaces, 0 to 1.
    pub absorptance: f64,
    /// External surface heat transfer resistance, in m2.K/W.
    pub external_surface_resistance: f64,
    /// Long-wave emissivity of external surfaces, 0 to 1.
    pub emissivity: f64,
    /// Solar reflectivity of the ground, 0 to 1, used when building the
    /// climate context.
    pub ground_albedo: f64,
}

impl Default for SolarConfig {
    fn default() -> Self {
        Self {
            absorptance: 0.6,
            external_surface_resistance: 0.04,
            emissivity: 0.9,
            ground_albedo: 0.2,
        }
    }
}

/// Hourly total solar heat flow into one building, in W: glazing-transmitted
/// gains plus opaque-envelope absorbed gains net of long-wave sky losses.
#[derive(Clone, Debug)]
pub struct SolarGains {
    series: Vec<f64>,
}

impl SolarGains {
    pub fn gain_w(&self, hour: HourOfYear) -> f64 {
        self.series[hour.index()]
    }

    pub fn series(&self) -> &[f64] {
        &self.series
    }

    /// An all-zero gain series, for synthetic runs without sun.
    pub fn zero() -> Self {
        Self {
            series: vec![0.0; crate::simulation_time::HOURS_IN_YEAR as usize],
        }
    }
}

/// Orientation-group azimuths come from `atan2(normal.y, normal.x)`,
/// counter-clockwise from east; the solar position uses compass azimuths,
/// clockwise from north. Only the difference between surface and solar
/// azimuth is physical, so the groups are mapped into the compass frame
/// here.
fn compass_azimuth(face_azimuth: f64) -> f64 {
    (90.0 - face_azimuth).rem_euclid(360.0)
}

/// Compute the annual solar gain series for one building.
///
/// Per orientation group: the window share of the vertical area transmits
/// plane-of-array irradiance scaled by the solar factor; the opaque share
/// absorbs irradiance conducted inward through the wall (absorptance times
/// U-value times external surface resistance). The roof does the same at
/// zero tilt. Opaque surfaces additionally lose a constant long-wave flow
/// to the sky, weighted by their sky view fraction.
pub fn annual_solar_gains(
    profile: &SurfaceAreaProfile,
    constructions: &EnvelopeConstructions,
    conditions: &ExternalConditions,
    config: &SolarConfig,
) -> SolarGains {
    let wwr = constructions.window.window_to_wall_ratio;
    let solar_factor = constructions.window.solar_factor;
    let wall_u = constructions.walls.u_value;
    let roof_u = constructions.roof.u_value;
    let r_se = config.external_surface_resistance;
    let radiative_coefficient = RADIATIVE_COEFFICIENT_PER_EMISSIVITY * config.emissivity;

    let groups: Vec<(f64, f64)> = profile
        .orientation_groups
        .iter()
        .map(|group| (compass_azimuth(group.azimuth), group.area))
        .collect();

    // The sky loss does not vary with the weather, so it is a fixed offset
    // on every hour of the series.
    let wall_sky_loss: f64 = profile.total_vertical_area()
        * (1.0 - wwr)
        * wall_u
        * r_se
        * radiative_coefficient
        * SKY_TEMPERATURE_DIFFERENCE
        * WALL_SKY_VIEW_FRACTION;
    let roof_sky_loss = profile.horizontal_area
        * roof_u
        * r_se
        * radiative_coefficient
        * SKY_TEMPERATURE_DIFFERENCE
        * ROOF_SKY_VIEW_FRACTION;

    let series = annual_hours()
        .map(|hour| {
            let mut window_gain = 0.0;
            let mut opaque_gain = 0.0;
            for &(azimuth, area) in &groups {
                let poa = conditions.plane_of_array_irradiance(WALL_TILT, azimuth, hour);
                window_gain += area * wwr * poa * solar_factor;
                opaque_gain += area * (1.0 - wwr) * poa * config.absorptance * wall_u * r_se;
            }

            let roof_poa = conditions.plane_of_array_irradiance(ROOF_TILT, ROOF_AZIMUTH, hour);
            let roof_gain =
                profile.horizontal_area * roof_poa * config.absorptance * roof_u * r_se;

            window_gain + opaque_gain + roof_gain - wall_sky_loss - roof_sky_loss
        })
        .collect();

    SolarGains { series }
}
