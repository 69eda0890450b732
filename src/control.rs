//! Preset operations built on the gateway: power, fans and dashboard queries.

pub mod fan;
pub mod power;
pub mod presets;
