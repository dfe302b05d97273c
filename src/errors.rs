use thiserror::Error;

/// Errors that are fatal for a single building's simulation. A batch run
/// reports these against the building and carries on with the rest.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("degenerate thermal model: {0}")]
    Degenerate(#[from] DegenerateModelError),
}

#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The composite `{usage}_{bracket}_{region}` key has no entry in the
    /// archetype table. Lookup is exact-match with no fallback.
    #[error("no archetype entry for key '{0}'")]
    MissingArchetype(String),
    #[error("climate series '{name}' has {actual} entries, expected {expected}")]
    ClimateSeriesLength {
        name: &'static str,
        actual: usize,
        expected: usize,
    },
    #[error("schedule '{name}' has {actual} entries, expected {expected}")]
    ScheduleLength {
        name: &'static str,
        actual: usize,
        expected: usize,
    },
    #[error("schedule '{name}' contains fraction {value} outside [0, 1]")]
    ScheduleFractionOutOfRange { name: &'static str, value: f64 },
}

/// The thermal network cannot be formed or solved for this building.
#[derive(Debug, Error)]
pub enum DegenerateModelError {
    #[error("total heat capacity is zero, effective mass area is undefined")]
    ZeroHeatCapacity,
    #[error(
        "opaque envelope conductance exceeds the mass-surface coupling, \
         giving a non-positive mass-to-outdoor resistance"
    )]
    NonPositiveMassResistance,
    #[error("building has zero internal surface area, air and surface nodes are uncoupled")]
    ZeroSurfaceArea,
    #[error("heat balance matrix is singular at hour {hour}")]
    SingularSystem { hour: usize },
}

/// A [`ModelError`] with the identity of the building it occurred in, so a
/// batch run can skip the offending building and proceed.
#[derive(Debug, Error)]
#[error("building '{building_id}': {source}")]
pub struct BuildingRunError {
    pub building_id: String,
    #[source]
    pub source: ModelError,
}

impl BuildingRunError {
    pub(crate) fn new(building_id: impl Into<String>, source: ModelError) -> Self {
        Self {
            building_id: building_id.into(),
            source,
        }
    }
}
