use crate::core::units::DAYS_PER_YEAR;
use crate::errors::ConfigurationError;
use crate::simulation_time::{HourOfYear, HOURS_IN_DAY, HOURS_IN_YEAR};

/// Hourly climate context for one simulation run: outdoor temperature and
/// irradiance series plus the precomputed solar position, shared read-only
/// across every building in the run.
///
/// All series hold one entry per hour of the non-leap year. Solar angles are
/// in degrees; the azimuth convention is compass-style, clockwise from north.
#[derive(Clone, Debug)]
pub struct ExternalConditions {
    air_temperatures: Vec<f64>,
    direct_normal_radiation: Vec<f64>,
    diffuse_horizontal_radiation: Vec<f64>,
    global_horizontal_radiation: Vec<f64>,
    solar_zenith_angles: Vec<f64>,
    solar_azimuth_angles: Vec<f64>,
    ground_albedo: f64,
}

impl ExternalConditions {
    /// Build climate context from raw weather series, computing the solar
    /// position for every hour from the station metadata.
    ///
    /// Arguments:
    /// * `air_temperatures` - external air temperatures, in deg C (one entry per hour)
    /// * `direct_normal_radiation` - direct beam normal irradiance, in W/m2
    /// * `diffuse_horizontal_radiation` - diffuse horizontal irradiance, in W/m2
    /// * `global_horizontal_radiation` - global horizontal irradiance, in W/m2
    /// * `latitude` - latitude of weather station, in degrees
    /// * `longitude` - longitude of weather station, easterly +ve, in degrees
    /// * `timezone` - timezone offset of the weather file from UTC, in hours
    /// * `ground_albedo` - solar reflectivity of the ground, 0 to 1
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        air_temperatures: Vec<f64>,
        direct_normal_radiation: Vec<f64>,
        diffuse_horizontal_radiation: Vec<f64>,
        global_horizontal_radiation: Vec<f64>,
        latitude: f64,
        longitude: f64,
        timezone: f64,
        ground_albedo: f64,
    ) -> Result<Self, ConfigurationError> {
        let time_shift = init_time_shift(timezone, longitude);

        let solar_declinations = (0..DAYS_PER_YEAR)
            .map(|day| init_solar_declination(init_earth_orbit_deviation(day)))
            .collect::<Vec<f64>>();

        let equations_of_time = (0..DAYS_PER_YEAR)
            .map(init_equation_of_time)
            .collect::<Vec<f64>>();

        let solar_hour_angles = (0..HOURS_IN_YEAR)
            .map(|hour| {
                let solar_time = init_solar_time(
                    hour % HOURS_IN_DAY,
                    equations_of_time[(hour / HOURS_IN_DAY) as usize],
                    time_shift,
                );
                init_solar_hour_angle(solar_time)
            })
            .collect::<Vec<f64>>();

        let solar_altitudes = (0..HOURS_IN_YEAR)
            .map(|hour| {
                init_solar_altitude(
                    latitude,
                    solar_declinations[(hour / HOURS_IN_DAY) as usize],
                    solar_hour_angles[hour as usize],
                )
            })
            .collect::<Vec<f64>>();

        let solar_zenith_angles = solar_altitudes
            .iter()
            .map(|altitude| 90.0 - altitude)
            .collect::<Vec<f64>>();

        let solar_azimuth_angles = (0..HOURS_IN_YEAR)
            .map(|hour| {
                init_solar_azimuth_angle(
                    latitude,
                    solar_declinations[(hour / HOURS_IN_DAY) as usize],
                    solar_hour_angles[hour as usize],
                    solar_altitudes[hour as usize],
                )
            })
            .collect::<Vec<f64>>();

        Self::from_series(
            air_temperatures,
            direct_normal_radiation,
            diffuse_horizontal_radiation,
            global_horizontal_radiation,
            solar_zenith_angles,
            solar_azimuth_angles,
            ground_albedo,
        )
    }

    /// Build climate context from fully supplied series, including an
    /// externally computed solar position.
    pub fn from_series(
        air_temperatures: Vec<f64>,
        direct_normal_radiation: Vec<f64>,
        diffuse_horizontal_radiation: Vec<f64>,
        global_horizontal_radiation: Vec<f64>,
        solar_zenith_angles: Vec<f64>,
        solar_azimuth_angles: Vec<f64>,
        ground_albedo: f64,
    ) -> Result<Self, ConfigurationError> {
        check_series_length("air_temperatures", &air_temperatures)?;
        check_series_length("direct_normal_radiation", &direct_normal_radiation)?;
        check_series_length("diffuse_horizontal_radiation", &diffuse_horizontal_radiation)?;
        check_series_length("global_horizontal_radiation", &global_horizontal_radiation)?;
        check_series_length("solar_zenith_angles", &solar_zenith_angles)?;
        check_series_length("solar_azimuth_angles", &solar_azimuth_angles)?;

        Ok(Self {
            air_temperatures,
            direct_normal_radiation,
            diffuse_horizontal_radiation,
            global_horizontal_radiation,
            solar_zenith_angles,
            solar_azimuth_angles,
            ground_albedo,
        })
    }

    pub fn air_temp(&self, hour: HourOfYear) -> f64 {
        self.air_temperatures[hour.index()]
    }

    pub fn air_temperatures(&self) -> &[f64] {
        &self.air_temperatures
    }

    pub fn solar_zenith_angle(&self, hour: HourOfYear) -> f64 {
        self.solar_zenith_angles[hour.index()]
    }

    pub fn solar_azimuth_angle(&self, hour: HourOfYear) -> f64 {
        self.solar_azimuth_angles[hour.index()]
    }

    /// Global irradiance on a tilted, oriented plane using an isotropic-sky
    /// transposition: beam from direct normal irradiance and the angle of
    /// incidence, sky diffuse weighted by the sky view factor, ground
    /// reflection weighted by the ground view factor.
    ///
    /// Arguments:
    /// * `tilt` - tilt angle of the surface from horizontal, 0 to 180, in degrees
    /// * `azimuth` - surface azimuth, degrees clockwise from north
    /// * `hour` - the hour of year to evaluate
    pub fn plane_of_array_irradiance(&self, tilt: f64, azimuth: f64, hour: HourOfYear) -> f64 {
        let idx = hour.index();
        let zenith = self.solar_zenith_angles[idx];
        let tilt_rad = tilt.to_radians();

        let beam = if zenith < 90.0 {
            let zenith_rad = zenith.to_radians();
            let azimuth_difference =
                (self.solar_azimuth_angles[idx] - azimuth).to_radians();
            let cos_incidence = zenith_rad.cos() * tilt_rad.cos()
                + zenith_rad.sin() * tilt_rad.sin() * azimuth_difference.cos();
            self.direct_normal_radiation[idx] * cos_incidence.max(0.0)
        } else {
            0.0
        };

        let sky_diffuse =
            self.diffuse_horizontal_radiation[idx] * (1.0 + tilt_rad.cos()) / 2.0;
        let ground_reflected = self.global_horizontal_radiation[idx]
            * self.ground_albedo
            * (1.0 - tilt_rad.cos())
            / 2.0;

        beam + sky_diffuse + ground_reflected
    }
}

fn check_series_length(name: &'static str, series: &[f64]) -> Result<(), ConfigurationError> {
    if series.len() != HOURS_IN_YEAR as usize {
        return Err(ConfigurationError::ClimateSeriesLength {
            name,
            actual: series.len(),
            expected: HOURS_IN_YEAR as usize,
        });
    }
    Ok(())
}

fn init_earth_orbit_deviation(current_day: u32) -> f64 {
    let current_day = current_day + 1; //use 1-indexed day for this

    (360.0 / 365.0) * current_day as f64
}

fn init_solar_declination(earth_orbit_deviation: f64) -> f64 {
    //earth_orbit_deviation passed as degrees; shadow internally as radians for trig functions
    let earth_orbit_deviation = earth_orbit_deviation.to_radians();

    0.33281 - 22.984 * earth_orbit_deviation.cos()
        - 0.3499 * (2.0 * earth_orbit_deviation).cos()
        - 0.1398 * (3.0 * earth_orbit_deviation).cos()
        + 3.7872 * earth_orbit_deviation.sin()
        + 0.03205 * (2.0 * earth_orbit_deviation).sin()
        + 0.07187 * (3.0 * earth_orbit_deviation).sin()
}

/// Equation of time in minutes, piecewise over the 1-indexed day of year.
fn init_equation_of_time(current_day: u32) -> f64 {
    let current_day = (current_day + 1) as i32;

    match current_day {
        nday if current_day < 21 => 2.6 + 0.44 * nday as f64,
        nday if current_day < 136 => 5.2 + 9.0 * ((nday - 43) as f64 * 0.0357).cos(),
        nday if current_day < 241 => 1.4 - 5.0 * ((nday - 135) as f64 * 0.0449).cos(),
        nday if current_day < 336 => -6.3 - 10.0 * ((nday - 306) as f64 * 0.036).cos(),
        nday if current_day <= 366 => 0.45 * (nday - 359) as f64,
        _ => unreachable!("day of year is bounded by the annual hour iterator"),
    }
}

/// Time shift in hours between local clock time and solar time, from the
/// difference between the timezone meridian and the station longitude.
fn init_time_shift(timezone: f64, longitude: f64) -> f64 {
    timezone - longitude / 15.0
}

fn init_solar_time(hour_of_day: u32, equation_of_time: f64, time_shift: f64) -> f64 {
    // the simulation hour of day starts at 0 while the sun path convention
    // has the first hour section of the day running from 0h to 1h
    let hour_of_day = hour_of_day + 1;

    hour_of_day as f64 - (equation_of_time / 60.0) - time_shift
}

/// Solar hour angle in degrees, evaluated in the middle of the current hour,
/// limited to [-180, 180]. Positive before solar noon.
fn init_solar_hour_angle(solar_time: f64) -> f64 {
    let mut solar_angle = (180 / 12) as f64 * (12.5 - solar_time);

    if solar_angle > 180.0 {
        solar_angle -= 360.0;
    } else if solar_angle < -180.0 {
        solar_angle += 360.0;
    }

    solar_angle
}

/// Solar altitude in degrees: the angle between the solar beam and the
/// horizontal plane. Clamped to 0 below the horizon.
fn init_solar_altitude(latitude: f64, solar_declination: f64, solar_hour_angle: f64) -> f64 {
    let latitude = latitude.to_radians();
    let solar_declination = solar_declination.to_radians();
    let solar_hour_angle = solar_hour_angle.to_radians();

    let altitude = (solar_declination.sin() * latitude.sin()
        + solar_declination.cos() * latitude.cos() * solar_hour_angle.cos())
    .asin()
    .to_degrees();

    if altitude < 0.0001 {
        return 0.;
    }

    altitude
}

/// Solar azimuth in degrees clockwise from north. Before solar noon the sun
/// is on the eastern half (azimuth below 180), after on the western half.
fn init_solar_azimuth_angle(
    latitude: f64,
    solar_declination: f64,
    solar_hour_angle: f64,
    solar_altitude: f64,
) -> f64 {
    let latitude_rad = latitude.to_radians();
    let declination_rad = solar_declination.to_radians();
    let altitude_rad = solar_altitude.to_radians();

    let denominator = altitude_rad.cos() * latitude_rad.cos();
    if denominator.abs() < 1e-12 {
        return 0.0;
    }

    let cos_azimuth =
        (declination_rad.sin() - altitude_rad.sin() * latitude_rad.sin()) / denominator;
    let azimuth = cos_azimuth.clamp(-1.0, 1.0).acos().to_degrees();

    if solar_hour_angle >= 0.0 {
        azimuth
    } else {
        360.0 - azimuth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::*;

    const COPENHAGEN_LATITUDE: f64 = 55.6;
    const COPENHAGEN_LONGITUDE: f64 = 12.6;
    const COPENHAGEN_TIMEZONE: f64 = 1.0;

    #[fixture]
    fn conditions() -> ExternalConditions {
        ExternalConditions::new(
            vec![10.0; 8760],
            vec![500.0; 8760],
            vec![100.0; 8760],
            vec![400.0; 8760],
            COPENHAGEN_LATITUDE,
            COPENHAGEN_LONGITUDE,
            COPENHAGEN_TIMEZONE,
            0.2,
        )
        .unwrap()
    }

    #[rstest]
    fn series_of_wrong_length_is_rejected() {
        let result = ExternalConditions::new(
            vec![10.0; 100],
            vec![0.0; 8760],
            vec![0.0; 8760],
            vec![0.0; 8760],
            COPENHAGEN_LATITUDE,
            COPENHAGEN_LONGITUDE,
            COPENHAGEN_TIMEZONE,
            0.2,
        );
        assert!(matches!(
            result,
            Err(ConfigurationError::ClimateSeriesLength {
                name: "air_temperatures",
                actual: 100,
                ..
            })
        ));
    }

    #[rstest]
    fn summer_noon_sun_is_high_and_southerly(conditions: ExternalConditions) {
        // midday on the summer solstice (day 171)
        let noon = HourOfYear::new(171 * 24 + 11).unwrap();
        let zenith = conditions.solar_zenith_angle(noon);
        assert!(zenith < 45.0, "zenith was {zenith}");
        let azimuth = conditions.solar_azimuth_angle(noon);
        assert!(
            (120.0..=240.0).contains(&azimuth),
            "azimuth was {azimuth}"
        );
    }

    #[rstest]
    fn midnight_sun_is_below_horizon(conditions: ExternalConditions) {
        let midnight = HourOfYear::new(171 * 24).unwrap();
        assert_relative_eq!(conditions.solar_zenith_angle(midnight), 90.0);
    }

    #[rstest]
    fn horizontal_surface_sees_sky_diffuse_without_ground_reflection(
        conditions: ExternalConditions,
    ) {
        let midnight = HourOfYear::new(0).unwrap();
        // sun below horizon: no beam, full sky view, no ground view
        assert_relative_eq!(
            conditions.plane_of_array_irradiance(0.0, 0.0, midnight),
            100.0
        );
    }

    #[rstest]
    fn vertical_surface_mixes_half_sky_and_half_ground(conditions: ExternalConditions) {
        let midnight = HourOfYear::new(0).unwrap();
        let poa = conditions.plane_of_array_irradiance(90.0, 180.0, midnight);
        // half of diffuse (50) plus albedo-weighted half of global (40)
        assert_relative_eq!(poa, 50.0 + 40.0, epsilon = 1e-9);
    }

    #[rstest]
    fn south_face_receives_more_beam_than_north_face(conditions: ExternalConditions) {
        let noon = HourOfYear::new(171 * 24 + 11).unwrap();
        let south = conditions.plane_of_array_irradiance(90.0, 180.0, noon);
        let north = conditions.plane_of_array_irradiance(90.0, 0.0, noon);
        assert!(south > north, "south {south} vs north {north}");
    }
}
