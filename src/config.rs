//! Configuration: JSON file settings and environment-provided BMC credentials.

pub mod credentials;
pub mod persistence;
pub mod types;
