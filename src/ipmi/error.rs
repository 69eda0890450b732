//! Gateway error kinds and their HTTP mapping.

use std::time::Duration;

use axum::http::StatusCode;
use thiserror::Error;

use super::command::ALLOWED_COMMAND_LIST;

/// Hard failures of a gateway call. A parse miss is not an error here; it is
/// reported through [`super::types::Execution::RawFallback`].
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request is malformed (missing command, out-of-range fan speed, ...).
    #[error("{0}")]
    InvalidInput(String),

    /// The subcommand is not on the allow-list.
    #[error("Command not allowed. Allowed commands: {}", ALLOWED_COMMAND_LIST)]
    Forbidden { command: String },

    /// One or more BMC connection variables are unset or empty.
    #[error("BMC configuration is missing ({missing}). Please check environment variables.")]
    ConfigurationMissing { missing: String },

    /// Spawn error, non-zero exit or stderr output. Carries the tool's text verbatim.
    #[error("{0}")]
    ProcessFailure(String),

    #[error("ipmitool did not finish within {:.1}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("ipmitool invocation was cancelled")]
    Cancelled,
}

impl GatewayError {
    /// HTTP status reported to the dashboard for this failure.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::ConfigurationMissing { .. } | Self::ProcessFailure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Stable label used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "InvalidInput",
            Self::Forbidden { .. } => "Forbidden",
            Self::ConfigurationMissing { .. } => "ConfigurationMissing",
            Self::ProcessFailure(_) => "ProcessFailure",
            Self::Timeout(_) => "Timeout",
            Self::Cancelled => "Cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_message_enumerates_allow_list() {
        let err = GatewayError::Forbidden { command: "shell".to_string() };
        assert_eq!(
            err.to_string(),
            "Command not allowed. Allowed commands: sdr, sensor, chassis, power, sel, user, lan, fru, raw"
        );
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn process_failure_is_verbatim() {
        let err = GatewayError::ProcessFailure("Error: Unable to establish IPMI v2 / RMCP+ session\n".to_string());
        assert_eq!(err.to_string(), "Error: Unable to establish IPMI v2 / RMCP+ session\n");
        assert_eq!(err.kind(), "ProcessFailure");
    }

    #[test]
    fn status_codes_by_kind() {
        assert_eq!(GatewayError::InvalidInput("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            GatewayError::ConfigurationMissing { missing: "IDRAC_IP".into() }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(GatewayError::Timeout(Duration::from_secs(1)).status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(GatewayError::Cancelled.kind(), "Cancelled");
    }
}
