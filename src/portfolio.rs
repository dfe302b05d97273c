use crate::core::archetype::{ArchetypeStore, UsageClass};
use crate::core::building::BuildingModel;
use crate::core::geometry::GeometryConfig;
use crate::core::internal_gains::InternalGains;
use crate::core::schedule::UsageSchedules;
use crate::core::solar_gains::{annual_solar_gains, SolarConfig};
use crate::core::thermal_network::{LoadSeries, ThermalConfig, ThermalNetwork};
use crate::errors::{BuildingRunError, ModelError};
use crate::external_conditions::ExternalConditions;
use crate::input::{BuildingInput, PortfolioInput};
use rayon::prelude::*;
use tracing::{error, info};

/// All tunable parameters of the engine, passed in explicitly rather than
/// read from module-level state so runs and tests can vary them freely.
#[derive(Clone, Copy, Debug, Default)]
pub struct EngineConfig {
    pub geometry: GeometryConfig,
    pub solar: SolarConfig,
    pub thermal: ThermalConfig,
}

/// The fraction schedules available to a run, one set per usage class.
#[derive(Clone, Debug)]
pub struct ScheduleLibrary {
    residential: UsageSchedules,
    commercial: UsageSchedules,
}

impl ScheduleLibrary {
    /// Per-class overrides on top of the built-in daily profiles.
    pub fn new(
        residential: Option<UsageSchedules>,
        commercial: Option<UsageSchedules>,
    ) -> Self {
        Self {
            residential: residential
                .unwrap_or_else(|| UsageSchedules::default_for(UsageClass::Residential)),
            commercial: commercial
                .unwrap_or_else(|| UsageSchedules::default_for(UsageClass::Commercial)),
        }
    }

    pub fn for_usage(&self, usage: UsageClass) -> &UsageSchedules {
        match usage {
            UsageClass::Residential => &self.residential,
            UsageClass::Commercial => &self.commercial,
        }
    }
}

impl Default for ScheduleLibrary {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// The output of one building's simulation: the annual load series and the
/// summary scalars reported alongside it.
#[derive(Clone, Debug)]
pub struct BuildingResult {
    pub building_id: String,
    /// Conditioned floor area, in m2.
    pub floor_area: f64,
    /// Total envelope heat capacity, in J/K.
    pub total_heat_capacity: f64,
    /// Floor U-value, in W/(m2.K).
    pub floor_u_value: f64,
    pub loads: LoadSeries,
}

/// One simulation run over a set of buildings. The archetype table, climate
/// context and schedules are shared read-only across buildings; each
/// building's simulation is independent, so the set fans out across worker
/// threads with no locking.
#[derive(Debug)]
pub struct Portfolio {
    buildings: Vec<BuildingInput>,
    archetypes: ArchetypeStore,
    conditions: ExternalConditions,
    schedules: ScheduleLibrary,
    config: EngineConfig,
}

impl Portfolio {
    pub fn new(
        input: PortfolioInput,
        archetypes: ArchetypeStore,
        conditions: ExternalConditions,
        schedules: ScheduleLibrary,
        config: EngineConfig,
    ) -> Self {
        Self {
            buildings: input.buildings,
            archetypes,
            conditions,
            schedules,
            config,
        }
    }

    /// Simulate every building. A failed building is reported with its
    /// identity and skipped; the rest of the run proceeds.
    pub fn run(&self) -> Vec<Result<BuildingResult, BuildingRunError>> {
        info!("simulating {} buildings", self.buildings.len());
        self.buildings
            .par_iter()
            .map(|building| {
                self.run_building(building).map_err(|source| {
                    let run_error = BuildingRunError::new(&building.id, source);
                    error!("{run_error}");
                    run_error
                })
            })
            .collect()
    }

    fn run_building(&self, building: &BuildingInput) -> Result<BuildingResult, ModelError> {
        let constructions = *self.archetypes.resolve(
            building.usage,
            building.construction_year,
            building.region,
        )?;

        let model = BuildingModel::new(&building.shell(), constructions, &self.config.geometry);

        let solar_gains = annual_solar_gains(
            &model.profile,
            &model.constructions,
            &self.conditions,
            &self.config.solar,
        );
        let internal_gains = InternalGains::build(
            building.usage,
            model.floor_area,
            self.schedules.for_usage(building.usage),
        );

        let network = ThermalNetwork::new(&model, self.config.thermal)?;
        let loads = network.run_annual(&self.conditions, &solar_gains, &internal_gains)?;

        Ok(BuildingResult {
            building_id: building.id.clone(),
            floor_area: model.floor_area,
            total_heat_capacity: network.total_heat_capacity(),
            floor_u_value: constructions.floor.u_value,
            loads,
        })
    }
}
