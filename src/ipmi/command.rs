//! Allow-listed ipmitool subcommands, argument sanitization and command-line construction.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;

use super::error::GatewayError;
use crate::config::credentials::BmcCredentials;

/// Comma-separated allow-list, as reported in `Forbidden` errors.
pub const ALLOWED_COMMAND_LIST: &str = "sdr, sensor, chassis, power, sel, user, lan, fru, raw";

/// Characters stripped from every argument before it reaches the command line.
pub const SHELL_METACHARACTERS: [char; 5] = [';', '&', '|', '<', '>'];

/// The nine ipmitool subcommands the dashboard may invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpmiCommand {
    Sdr,
    Sensor,
    Chassis,
    Power,
    Sel,
    User,
    Lan,
    Fru,
    Raw,
}

impl IpmiCommand {
    pub const ALL: [IpmiCommand; 9] = [
        Self::Sdr,
        Self::Sensor,
        Self::Chassis,
        Self::Power,
        Self::Sel,
        Self::User,
        Self::Lan,
        Self::Fru,
        Self::Raw,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sdr => "sdr",
            Self::Sensor => "sensor",
            Self::Chassis => "chassis",
            Self::Power => "power",
            Self::Sel => "sel",
            Self::User => "user",
            Self::Lan => "lan",
            Self::Fru => "fru",
            Self::Raw => "raw",
        }
    }

    /// `sdr` and `sensor` print the pipe-delimited sensor table.
    pub const fn lists_sensors(self) -> bool {
        matches!(self, Self::Sdr | Self::Sensor)
    }
}

impl fmt::Display for IpmiCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IpmiCommand {
    type Err = GatewayError;

    // Exact, case-sensitive match against the allow-list.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|cmd| cmd.as_str() == s)
            .ok_or_else(|| GatewayError::Forbidden { command: s.to_string() })
    }
}

/// Strip shell metacharacters from a single argument. Characters are removed, not escaped.
pub fn sanitize_arg(arg: &str) -> String {
    arg.chars().filter(|c| !SHELL_METACHARACTERS.contains(c)).collect()
}

/// Request body accepted from the dashboard: `{ "command": ..., "args": [...] }`.
///
/// Fields stay loosely typed so that malformed input is reported through the
/// gateway's own error kinds rather than a deserializer error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IpmiRequest {
    #[serde(default)]
    pub command: Option<Value>,
    #[serde(default)]
    pub args: Option<Value>,
}

impl IpmiRequest {
    pub fn new(command: &str, args: &[&str]) -> Self {
        Self {
            command: Some(Value::String(command.to_string())),
            args: Some(Value::Array(args.iter().map(|a| Value::String(a.to_string())).collect())),
        }
    }

    /// Check the command against the allow-list and collect string arguments.
    ///
    /// A missing, null or empty command is `InvalidInput`; anything else that is
    /// not an allow-listed name is `Forbidden`. Non-string array members are
    /// dropped and a non-array `args` is ignored.
    pub fn validate(self) -> Result<SubcommandRequest, GatewayError> {
        let command = match self.command {
            None | Some(Value::Null) => {
                return Err(GatewayError::InvalidInput("Command is required".to_string()))
            }
            Some(Value::String(s)) if s.is_empty() => {
                return Err(GatewayError::InvalidInput("Command is required".to_string()))
            }
            Some(Value::String(s)) => s.parse::<IpmiCommand>()?,
            Some(other) => return Err(GatewayError::Forbidden { command: other.to_string() }),
        };

        let args = match self.args {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };

        Ok(SubcommandRequest { command, args })
    }
}

/// A validated gateway request. `args` are the caller's strings, unsanitized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubcommandRequest {
    pub command: IpmiCommand,
    pub args: Vec<String>,
}

impl SubcommandRequest {
    pub fn new<I, S>(command: IpmiCommand, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Sanitized arguments in their original order. Arguments that are empty
    /// after sanitization are dropped.
    pub fn sanitized_args(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| sanitize_arg(arg))
            .filter(|arg| !arg.is_empty())
            .collect()
    }
}

/// A fully built external invocation: program plus argument vector.
///
/// The process is spawned from the vector directly, never through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    password_index: Option<usize>,
}

impl Invocation {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self { program: program.into(), args, password_index: None }
    }

    /// `<tool> -I <interface> -H <host> -U <user> -P <password> <command> [args...]`
    pub fn build(
        tool: &str,
        interface: &str,
        credentials: &BmcCredentials,
        request: &SubcommandRequest,
    ) -> Self {
        let mut args = vec![
            "-I".to_string(),
            interface.to_string(),
            "-H".to_string(),
            credentials.host.clone(),
            "-U".to_string(),
            credentials.username.clone(),
            "-P".to_string(),
            credentials.password.clone(),
            request.command.as_str().to_string(),
        ];
        args.extend(request.sanitized_args());

        Self { password_index: Some(7), ..Self::new(tool, args) }
    }

    /// Single-line rendering for logs, password masked.
    pub fn redacted(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(self.program.clone());
        for (i, arg) in self.args.iter().enumerate() {
            if Some(i) == self.password_index {
                parts.push("\"****\"".to_string());
            } else {
                parts.push(arg.clone());
            }
        }
        parts.join(" ")
    }
}
