use crate::core::archetype::{Region, UsageClass};
use crate::core::geometry::{BuildingShell, Face};
use serde::Deserialize;
use std::io::Read;

/// The set of buildings submitted for one simulation run, as produced by
/// the geographic ingestion pipeline.
#[derive(Clone, Debug, Deserialize)]
pub struct PortfolioInput {
    pub buildings: Vec<BuildingInput>,
}

/// One building as supplied by the host: identity, classification inputs
/// for archetype resolution, and the shell geometry read-only view (face
/// normals/areas plus bounding height).
#[derive(Clone, Debug, Deserialize)]
pub struct BuildingInput {
    pub id: String,
    pub usage: UsageClass,
    pub construction_year: i32,
    pub region: Region,
    /// Overall bounding height of the shell, in m.
    pub height: f64,
    pub faces: Vec<Face>,
}

impl BuildingInput {
    pub fn shell(&self) -> BuildingShell {
        BuildingShell {
            faces: self.faces.clone(),
            height: self.height,
        }
    }
}

pub fn ingest_portfolio(input: impl Read) -> anyhow::Result<PortfolioInput> {
    Ok(serde_json::from_reader(input)?)
}
