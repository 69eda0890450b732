//! Chassis power actions.

use std::fmt;
use std::str::FromStr;

use crate::ipmi::{GatewayError, IpmiCommand, SubcommandRequest};

/// State-changing `power` subcommands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerAction {
    On,
    Off,
    Cycle,
    Reset,
}

impl PowerAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Cycle => "cycle",
            Self::Reset => "reset",
        }
    }

    pub fn request(self) -> SubcommandRequest {
        SubcommandRequest::new(IpmiCommand::Power, [self.as_str()])
    }
}

impl fmt::Display for PowerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PowerAction {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            "cycle" => Ok(Self::Cycle),
            "reset" => Ok(Self::Reset),
            other => Err(GatewayError::InvalidInput(format!(
                "Unknown power action '{}'. Expected one of: on, off, cycle, reset",
                other
            ))),
        }
    }
}

pub fn power_status_request() -> SubcommandRequest {
    SubcommandRequest::new(IpmiCommand::Power, ["status"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_build_power_requests() {
        assert_eq!(PowerAction::Cycle.request().args, vec!["cycle"]);
        assert_eq!("reset".parse::<PowerAction>().unwrap(), PowerAction::Reset);
        assert!("status".parse::<PowerAction>().is_err());
        assert!("ON".parse::<PowerAction>().is_err());
    }
}
