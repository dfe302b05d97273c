use crate::core::building::BuildingModel;
use crate::core::internal_gains::InternalGains;
use crate::core::solar_gains::SolarGains;
use crate::core::units::SECONDS_PER_HOUR;
use crate::errors::DegenerateModelError;
use crate::external_conditions::ExternalConditions;
use crate::simulation_time::annual_hours;
use nalgebra::{Matrix3, Vector3};

// Surface heat transfer coefficients of the lumped network
const SURFACE_AIR_COEFFICIENT: f64 = 3.45; // W/(m2.K)
const MASS_SURFACE_COEFFICIENT: f64 = 9.1; // W/(m2.K)

// Ratio of internal surface area to conditioned floor area
const TOTAL_SURFACE_AREA_RATIO: f64 = 4.5;

// Heat capacity flow of ventilation air per air change, in W/(m3.K)
const VENTILATION_HEAT_CAPACITY: f64 = 0.33;

const TIMESTEP: f64 = SECONDS_PER_HOUR as f64;

/// Comfort and ventilation parameters of the solver, passed in explicitly
/// so tests can vary setpoints and air change rates without global state.
#[derive(Clone, Copy, Debug)]
pub struct ThermalConfig {
    /// Heating setpoint in deg C.
    pub heating_setpoint: f64,
    /// Cooling setpoint in deg C.
    pub cooling_setpoint: f64,
    /// Ventilation air change rate, in 1/h.
    pub air_changes_per_hour: f64,
    /// Cooling loads are discarded when the outdoor temperature is more
    /// than this margin below the cooling setpoint, in K.
    pub cooling_suppression_margin: f64,
}

impl Default for ThermalConfig {
    fn default() -> Self {
        Self {
            heating_setpoint: 20.0,
            cooling_setpoint: 27.0,
            air_changes_per_hour: 0.5,
            cooling_suppression_margin: 3.0,
        }
    }
}

/// One hour of simulation output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HourlyLoad {
    /// Reported indoor air temperature, in deg C.
    pub indoor_temperature: f64,
    /// Net heating/cooling load in W, rounded to the nearest watt.
    /// Positive values are heating, negative values are cooling.
    pub net_load: f64,
}

/// The annual simulation output for one building: 8,760 hourly results in
/// order. The load sign convention is positive = heating, negative =
/// cooling, applied uniformly across the engine.
#[derive(Clone, Debug)]
pub struct LoadSeries {
    pub hours: Vec<HourlyLoad>,
}

/// The fixed 3-node (air, envelope surface, envelope mass) heat-balance
/// network of one building. All conductances are derived once from the
/// geometry and constructions; only the mass-node temperature persists
/// between hours.
#[derive(Clone, Debug)]
pub struct ThermalNetwork {
    /// Ventilation plus window conductance, air to outdoor, in W/K.
    ventilation_window_conductance: f64,
    /// Surface-to-air conductance, in W/K.
    surface_air_conductance: f64,
    /// Mass-to-surface conductance, in W/K.
    mass_surface_conductance: f64,
    /// Opaque-envelope conductance from the mass node to outdoor, in W/K.
    mass_outdoor_conductance: f64,
    /// Total thermal capacity of the envelope, in J/K.
    total_heat_capacity: f64,
    /// Effective mass area, in m2.
    effective_mass_area: f64,
    /// Total internal surface area, in m2.
    total_surface_area: f64,
    config: ThermalConfig,
}

impl ThermalNetwork {
    pub fn new(model: &BuildingModel, config: ThermalConfig) -> Result<Self, DegenerateModelError> {
        let constructions = &model.constructions;
        let floor_area_single = model.profile.horizontal_area;
        let opaque_wall_area = model.opaque_wall_area();

        // Thermal mass over floor, roof and opaque walls; windows are
        // excluded.
        let capacity_area_pairs = [
            (constructions.floor.areal_heat_capacity, floor_area_single),
            (constructions.roof.areal_heat_capacity, floor_area_single),
            (constructions.walls.areal_heat_capacity, opaque_wall_area),
        ];
        let total_heat_capacity: f64 = capacity_area_pairs
            .iter()
            .map(|(capacity, area)| capacity * area)
            .sum();
        let capacity_squared_area: f64 = capacity_area_pairs
            .iter()
            .map(|(capacity, area)| capacity * capacity * area)
            .sum();
        if capacity_squared_area <= 0.0 {
            return Err(DegenerateModelError::ZeroHeatCapacity);
        }
        let effective_mass_area = total_heat_capacity.powi(2) / capacity_squared_area;

        let total_surface_area = TOTAL_SURFACE_AREA_RATIO * model.floor_area;
        if total_surface_area <= 0.0 {
            return Err(DegenerateModelError::ZeroSurfaceArea);
        }

        let opaque_conductance = constructions.floor.u_value * floor_area_single
            + constructions.roof.u_value * floor_area_single
            + constructions.walls.u_value * opaque_wall_area;
        let mass_surface_conductance = MASS_SURFACE_COEFFICIENT * effective_mass_area;
        let mass_outdoor_conductance = if opaque_conductance > 0.0 {
            let mass_outdoor_resistance =
                1.0 / opaque_conductance - 1.0 / mass_surface_conductance;
            if mass_outdoor_resistance <= 0.0 {
                return Err(DegenerateModelError::NonPositiveMassResistance);
            }
            1.0 / mass_outdoor_resistance
        } else {
            0.0
        };

        let ventilation_conductance =
            VENTILATION_HEAT_CAPACITY * config.air_changes_per_hour * model.volume;
        let window_conductance = constructions.window.u_value * model.window_area();

        Ok(Self {
            ventilation_window_conductance: ventilation_conductance + window_conductance,
            surface_air_conductance: SURFACE_AIR_COEFFICIENT * total_surface_area,
            mass_surface_conductance,
            mass_outdoor_conductance,
            total_heat_capacity,
            effective_mass_area,
            total_surface_area,
            config,
        })
    }

    /// Total thermal capacity of the envelope, in J/K.
    pub fn total_heat_capacity(&self) -> f64 {
        self.total_heat_capacity
    }

    /// Effective mass area coupling the mass node to the surface node, in m2.
    pub fn effective_mass_area(&self) -> f64 {
        self.effective_mass_area
    }

    /// Run the annual simulation. The mass-node temperature is the only
    /// state carried hour to hour: each step is a first-order recurrence on
    /// the previous hour's solution, so the hours are evaluated strictly in
    /// order.
    pub fn run_annual(
        &self,
        conditions: &ExternalConditions,
        solar_gains: &SolarGains,
        internal_gains: &InternalGains,
    ) -> Result<LoadSeries, DegenerateModelError> {
        let mut hours = Vec::with_capacity(conditions.air_temperatures().len());

        let mut mass_temperature =
            (conditions.air_temperatures()[0] + self.config.heating_setpoint) / 2.0;

        for hour in annual_hours() {
            let outdoor = conditions.air_temp(hour);
            let step = self.step_hour(
                mass_temperature,
                outdoor,
                internal_gains.gain_w(hour),
                solar_gains.gain_w(hour),
                hour.index(),
            )?;
            mass_temperature = step.mass_temperature;
            hours.push(HourlyLoad {
                indoor_temperature: step.indoor_temperature,
                net_load: step.net_load,
            });
        }

        // Discard cooling calls during hours cold enough that they can only
        // be solver sign artifacts, then round to whole watts.
        for (result, outdoor) in hours.iter_mut().zip(conditions.air_temperatures()) {
            if result.net_load < 0.0
                && *outdoor < self.config.cooling_setpoint - self.config.cooling_suppression_margin
            {
                result.net_load = 0.0;
            }
            result.net_load = result.net_load.round();
        }

        Ok(LoadSeries { hours })
    }

    /// Evaluate one hour of the three-mode thermostat state machine:
    /// free-float first, then re-solve with the air node pinned to
    /// whichever setpoint the free-float temperature violated.
    fn step_hour(
        &self,
        previous_mass_temperature: f64,
        outdoor: f64,
        internal_gain: f64,
        solar_gain: f64,
        hour: usize,
    ) -> Result<HourStep, DegenerateModelError> {
        let gains = self.node_gains(internal_gain, solar_gain);

        let free_float =
            self.solve_free_float(previous_mass_temperature, outdoor, &gains, hour)?;

        if free_float.x < self.config.heating_setpoint {
            let pinned = self.solve_pinned(
                self.config.heating_setpoint,
                previous_mass_temperature,
                outdoor,
                &gains,
                hour,
            )?;
            Ok(HourStep {
                indoor_temperature: self.config.heating_setpoint,
                net_load: pinned.x,
                mass_temperature: pinned.z,
            })
        } else if free_float.x > self.config.cooling_setpoint {
            let pinned = self.solve_pinned(
                self.config.cooling_setpoint,
                previous_mass_temperature,
                outdoor,
                &gains,
                hour,
            )?;
            Ok(HourStep {
                indoor_temperature: self.config.cooling_setpoint,
                net_load: pinned.x,
                mass_temperature: pinned.z,
            })
        } else {
            Ok(HourStep {
                indoor_temperature: free_float.x,
                net_load: 0.0,
                mass_temperature: free_float.z,
            })
        }
    }

    /// Allocate the hour's solar and internal gains to the three nodes:
    /// half of the internal gains are convective and go to the air node,
    /// the rest plus all solar gains split between mass and surface by the
    /// effective-mass-area share of the total internal surface.
    fn node_gains(&self, internal_gain: f64, solar_gain: f64) -> NodeGains {
        let air = 0.5 * internal_gain;
        let radiative = 0.5 * internal_gain + solar_gain;
        let mass_share = self.effective_mass_area / self.total_surface_area;
        NodeGains {
            air,
            surface: (1.0 - mass_share) * radiative,
            mass: mass_share * radiative,
        }
    }

    /// Solve the heat balance with zero heating/cooling input. Unknowns:
    /// air, surface and mass temperatures.
    fn solve_free_float(
        &self,
        previous_mass_temperature: f64,
        outdoor: f64,
        gains: &NodeGains,
        hour: usize,
    ) -> Result<Vector3<f64>, DegenerateModelError> {
        let h_ve = self.ventilation_window_conductance;
        let h_sa = self.surface_air_conductance;
        let h_ms = self.mass_surface_conductance;
        let h_em = self.mass_outdoor_conductance;
        let capacity_per_step = self.total_heat_capacity / TIMESTEP;

        let coefficients = Matrix3::new(
            h_ve + h_sa,
            -h_sa,
            0.0,
            -h_sa,
            h_sa + h_ms,
            -h_ms,
            0.0,
            -h_ms,
            capacity_per_step + h_ms + h_em,
        );
        let rhs = Vector3::new(
            h_ve * outdoor + gains.air,
            gains.surface,
            capacity_per_step * previous_mass_temperature + h_em * outdoor + gains.mass,
        );

        coefficients
            .lu()
            .solve(&rhs)
            .ok_or(DegenerateModelError::SingularSystem { hour })
    }

    /// Solve with the air-node equation replaced by the equality constraint
    /// pinning the air temperature to a setpoint. Unknowns: required
    /// heating/cooling input, surface and mass temperatures.
    fn solve_pinned(
        &self,
        setpoint: f64,
        previous_mass_temperature: f64,
        outdoor: f64,
        gains: &NodeGains,
        hour: usize,
    ) -> Result<Vector3<f64>, DegenerateModelError> {
        let h_ve = self.ventilation_window_conductance;
        let h_sa = self.surface_air_conductance;
        let h_ms = self.mass_surface_conductance;
        let h_em = self.mass_outdoor_conductance;
        let capacity_per_step = self.total_heat_capacity / TIMESTEP;

        let coefficients = Matrix3::new(
            1.0,
            h_sa,
            0.0,
            0.0,
            h_sa + h_ms,
            -h_ms,
            0.0,
            -h_ms,
            capacity_per_step + h_ms + h_em,
        );
        let rhs = Vector3::new(
            (h_ve + h_sa) * setpoint - h_ve * outdoor - gains.air,
            gains.surface + h_sa * setpoint,
            capacity_per_step * previous_mass_temperature + h_em * outdoor + gains.mass,
        );

        coefficients
            .lu()
            .solve(&rhs)
            .ok_or(DegenerateModelError::SingularSystem { hour })
    }
}

struct NodeGains {
    air: f64,
    surface: f64,
    mass: f64,
}

struct HourStep {
    indoor_temperature: f64,
    net_load: f64,
    mass_temperature: f64,
}
