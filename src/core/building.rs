use crate::core::archetype::EnvelopeConstructions;
use crate::core::geometry::{
    extract_surface_profile, BuildingShell, GeometryConfig, SurfaceAreaProfile,
};
use crate::core::units::STOREY_HEIGHT;

/// The static description of one building entering the thermal simulation:
/// extracted surface quantities, resolved constructions and the quantities
/// derived from them. Created once per building, read-only thereafter.
#[derive(Clone, Debug)]
pub struct BuildingModel {
    pub profile: SurfaceAreaProfile,
    pub constructions: EnvelopeConstructions,
    /// Bounding height of the shell, in m.
    pub height: f64,
    pub storey_count: u32,
    /// Conditioned volume in m3: footprint area times bounding height.
    pub volume: f64,
    /// Total conditioned floor area in m2: footprint area times storeys.
    pub floor_area: f64,
}

impl BuildingModel {
    pub fn new(
        shell: &BuildingShell,
        constructions: EnvelopeConstructions,
        config: &GeometryConfig,
    ) -> Self {
        let profile = extract_surface_profile(shell, config);
        let storey_count = ((shell.height / STOREY_HEIGHT).floor() as i64).max(1) as u32;
        let volume = profile.horizontal_area * shell.height;
        let floor_area = profile.horizontal_area * storey_count as f64;

        Self {
            profile,
            constructions,
            height: shell.height,
            storey_count,
            volume,
            floor_area,
        }
    }

    /// Glazed area across all orientations, in m2.
    pub fn window_area(&self) -> f64 {
        self.profile.total_vertical_area() * self.constructions.window.window_to_wall_ratio
    }

    /// Opaque wall area across all orientations, in m2.
    pub fn opaque_wall_area(&self) -> f64 {
        self.profile.total_vertical_area()
            * (1.0 - self.constructions.window.window_to_wall_ratio)
    }
}
