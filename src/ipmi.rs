//! Command gateway: allow-listed ipmitool invocation and its result types.

pub mod command;
pub mod error;
pub mod gateway;
pub mod types;

pub use command::{IpmiCommand, IpmiRequest, SubcommandRequest};
pub use error::GatewayError;
pub use gateway::IpmiGateway;
pub use types::{ChassisStatus, Execution, IpmiData, IpmiResponse, SensorRecord};
