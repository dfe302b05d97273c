use crate::errors::ConfigurationError;
use indexmap::IndexMap;
use serde::Deserialize;
use std::io::Read;
use strum_macros::{Display, EnumIter};

/// Building usage classes supported by the archetype library. The set is
/// closed: anything else fails at ingest, before it can reach a lookup.
#[derive(Clone, Copy, Debug, Deserialize, Display, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UsageClass {
    #[strum(serialize = "RES_1")]
    Residential,
    #[strum(serialize = "COM_1")]
    Commercial,
}

/// Climate regions with archetype coverage.
#[derive(Clone, Copy, Debug, Deserialize, Display, EnumIter, PartialEq, Eq, Hash)]
pub enum Region {
    #[serde(rename = "DK")]
    #[strum(serialize = "DK")]
    Dk,
    #[serde(rename = "US_2A")]
    #[strum(serialize = "US_2A")]
    Us2A,
    #[serde(rename = "US_3C")]
    #[strum(serialize = "US_3C")]
    Us3C,
    #[serde(rename = "US_5A")]
    #[strum(serialize = "US_5A")]
    Us5A,
}

/// Construction-year bracket label for a region. The bracket tables differ
/// in granularity: the Danish library distinguishes ten eras, the US
/// libraries three.
pub fn year_bracket(region: Region, year: i32) -> &'static str {
    match region {
        Region::Dk => match year {
            ..=1850 => "1850",
            1851..=1930 => "1851_1930",
            1931..=1950 => "1931_1950",
            1951..=1960 => "1951_1960",
            1961..=1972 => "1961_1972",
            1973..=1978 => "1973_1978",
            1979..=1998 => "1979_1998",
            1999..=2006 => "1999_2006",
            2007..=2010 => "2007_2010",
            _ => "2011",
        },
        Region::Us2A | Region::Us3C | Region::Us5A => match year {
            ..=1979 => "1980",
            1980..=2004 => "1980_2004",
            _ => "2004",
        },
    }
}

/// Thermal properties of one opaque envelope part.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct ConstructionProperties {
    /// Thermal transmittance in W/(m2.K).
    #[serde(rename = "Uvalue")]
    pub u_value: f64,
    /// Areal heat capacity in J/(m2.K).
    #[serde(rename = "k_m")]
    pub areal_heat_capacity: f64,
}

/// Thermal and solar properties of the window construction. The areal heat
/// capacity is carried from the library but windows are excluded from the
/// thermal mass of the building.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct WindowProperties {
    #[serde(rename = "Uvalue")]
    pub u_value: f64,
    #[serde(rename = "k_m")]
    pub areal_heat_capacity: f64,
    /// Solar factor (g-factor): fraction of incident solar energy
    /// transmitted through the glazing, 0 to 1.
    #[serde(rename = "g-factor")]
    pub solar_factor: f64,
    /// Window-to-wall ratio, 0 to 1.
    #[serde(rename = "wwr")]
    pub window_to_wall_ratio: f64,
}

/// The four construction property sets resolved for one building.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct EnvelopeConstructions {
    pub floor: ConstructionProperties,
    pub walls: ConstructionProperties,
    pub roof: ConstructionProperties,
    pub window: WindowProperties,
}

#[derive(Debug, Deserialize)]
struct ArchetypeRecord {
    name: String,
    constructions: EnvelopeConstructions,
}

#[derive(Debug, Deserialize)]
struct ArchetypeFile {
    archetypes: Vec<ArchetypeRecord>,
}

/// The archetype reference table, loaded once per run and shared read-only
/// across buildings. Lookup is exact-match on the composite key; a missing
/// key is an error, never a default.
#[derive(Clone, Debug, Default)]
pub struct ArchetypeStore {
    entries: IndexMap<String, EnvelopeConstructions>,
}

impl ArchetypeStore {
    pub fn from_reader(reader: impl Read) -> anyhow::Result<Self> {
        let file: ArchetypeFile = serde_json::from_reader(reader)?;
        Ok(Self {
            entries: file
                .archetypes
                .into_iter()
                .map(|record| (record.name, record.constructions))
                .collect(),
        })
    }

    /// Insert a single archetype under its composite key.
    pub fn insert(
        &mut self,
        usage: UsageClass,
        year: i32,
        region: Region,
        constructions: EnvelopeConstructions,
    ) {
        self.entries
            .insert(composite_key(usage, year, region), constructions);
    }

    /// Resolve the envelope constructions for a building.
    pub fn resolve(
        &self,
        usage: UsageClass,
        year: i32,
        region: Region,
    ) -> Result<&EnvelopeConstructions, ConfigurationError> {
        let key = composite_key(usage, year, region);
        self.entries
            .get(&key)
            .ok_or(ConfigurationError::MissingArchetype(key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Composite archetype key, e.g. `RES_1_1931_1950_DK`.
fn composite_key(usage: UsageClass, year: i32, region: Region) -> String {
    format!("{usage}_{}_{region}", year_bracket(region, year))
}
