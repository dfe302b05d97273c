pub mod archetype;
pub mod building;
pub mod geometry;
pub mod internal_gains;
pub mod schedule;
pub mod solar_gains;
pub mod thermal_network;
pub mod units;
