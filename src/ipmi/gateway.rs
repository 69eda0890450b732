//! IPMI command gateway: validates a request, builds the ipmitool invocation,
//! runs it under a timeout and hands stdout to the parser.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, warn, Instrument};
use uuid::Uuid;

use super::command::{Invocation, IpmiRequest, SubcommandRequest};
use super::error::GatewayError;
use super::types::{Execution, IpmiResponse};
use crate::config::credentials::CredentialSource;
use crate::config::types::IpmiSettings;
use crate::system::executor::{ProcessOutput, ProcessRunner};
use crate::system::parser;

/// Stateless apart from its configuration; safe to share across concurrent requests.
pub struct IpmiGateway {
    settings: IpmiSettings,
    credentials: CredentialSource,
    runner: Arc<dyn ProcessRunner>,
}

impl IpmiGateway {
    pub fn new(
        settings: IpmiSettings,
        credentials: CredentialSource,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        Self { settings, credentials, runner }
    }

    pub fn settings(&self) -> &IpmiSettings {
        &self.settings
    }

    /// Validate a raw dashboard request and execute it.
    pub async fn execute_request(&self, request: IpmiRequest) -> Result<Execution, GatewayError> {
        let request = request.validate().map_err(|e| {
            match &e {
                GatewayError::Forbidden { command } => {
                    warn!("Rejected command {}: not on the allow-list", command)
                }
                other => warn!("Rejected request: {} ({})", other, other.kind()),
            }
            e
        })?;
        self.execute(&request).await
    }

    /// Same as [`Self::execute_request`], folded into the wire response.
    pub async fn respond(&self, request: IpmiRequest) -> IpmiResponse {
        self.execute_request(request).await.into()
    }

    pub async fn execute(&self, request: &SubcommandRequest) -> Result<Execution, GatewayError> {
        self.execute_with_cancel(request, &CancellationToken::new()).await
    }

    /// Run one ipmitool process for `request`.
    ///
    /// Fails before spawning when credentials are missing. Once spawned, the
    /// child is killed if `cancel` fires or the configured timeout elapses.
    pub async fn execute_with_cancel(
        &self,
        request: &SubcommandRequest,
        cancel: &CancellationToken,
    ) -> Result<Execution, GatewayError> {
        let span = info_span!(
            "ipmitool",
            request_id = %Uuid::new_v4(),
            command = %request.command,
        );

        async {
            let credentials = self.credentials.resolve().map_err(|e| {
                warn!("{}", e);
                e
            })?;

            let invocation = Invocation::build(
                &self.settings.tool,
                &self.settings.interface,
                &credentials,
                request,
            );
            debug!("Executing: {}", invocation.redacted());

            let timeout = self.settings.timeout();
            let output = tokio::select! {
                result = self.runner.run(&invocation) => result.map_err(|e| {
                    warn!("Failed to execute {}: {}", self.settings.tool, e);
                    GatewayError::ProcessFailure(e.to_string())
                })?,
                _ = tokio::time::sleep(timeout) => {
                    warn!("{} timed out after {:?}", self.settings.tool, timeout);
                    return Err(GatewayError::Timeout(timeout));
                }
                _ = cancel.cancelled() => {
                    debug!("Invocation cancelled");
                    return Err(GatewayError::Cancelled);
                }
            };

            self.interpret(request, output)
        }
        .instrument(span)
        .await
    }

    fn interpret(
        &self,
        request: &SubcommandRequest,
        output: ProcessOutput,
    ) -> Result<Execution, GatewayError> {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            warn!("Command stderr: {}", stderr.trim_end());
            return Err(GatewayError::ProcessFailure(stderr.into_owned()));
        }
        if !output.success() {
            warn!("{} failed with {}", self.settings.tool, output.status_description());
            return Err(GatewayError::ProcessFailure(format!(
                "{} failed with {}",
                self.settings.tool,
                output.status_description()
            )));
        }

        match parser::parse_output(request.command, &request.args, &output.stdout) {
            Ok(data) => Ok(Execution::Parsed(data)),
            Err(e) => {
                warn!("Error parsing output: {}", e);
                Ok(Execution::RawFallback {
                    raw: String::from_utf8_lossy(&output.stdout).trim().to_string(),
                    note: format!("Could not parse output format: {}", e),
                })
            }
        }
    }
}
