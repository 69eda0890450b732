//! ipmitool subprocess executor.
//! Spawns one child per invocation from an argument vector (no shell involved).

use std::process::Stdio;

use async_trait::async_trait;
use tracing::trace;

use crate::ipmi::command::Invocation;

/// Captured result of a finished child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the child was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn status_description(&self) -> String {
        match self.exit_code {
            Some(code) => format!("exit status {}", code),
            None => "termination by signal".to_string(),
        }
    }
}

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run the invocation to completion. Dropping the returned future must
    /// terminate the child.
    async fn run(&self, invocation: &Invocation) -> std::io::Result<ProcessOutput>;
}

/// Runs invocations on the host with `tokio::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessRunner;

#[async_trait]
impl ProcessRunner for SystemProcessRunner {
    async fn run(&self, invocation: &Invocation) -> std::io::Result<ProcessOutput> {
        trace!("Spawning: {}", invocation.redacted());

        let child = tokio::process::Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = child.wait_with_output().await?;

        Ok(ProcessOutput {
            exit_code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}


#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout_and_exit_code() {
        let invocation = Invocation::new("sh", vec!["-c".into(), "echo 'FAN1 | 1800 RPM | ok'".into()]);
        let output = SystemProcessRunner.run(&invocation).await.unwrap();
        assert!(output.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout), "FAN1 | 1800 RPM | ok\n");
        assert!(output.stderr.is_empty());
    }

    #[tokio::test]
    async fn reports_non_zero_exit_and_stderr() {
        let invocation = Invocation::new("sh", vec!["-c".into(), "echo 'no session' >&2; exit 1".into()]);
        let output = SystemProcessRunner.run(&invocation).await.unwrap();
        assert!(!output.success());
        assert_eq!(output.exit_code, Some(1));
        assert_eq!(output.status_description(), "exit status 1");
        assert_eq!(String::from_utf8_lossy(&output.stderr), "no session\n");
    }

    #[tokio::test]
    async fn arguments_are_not_shell_interpreted() {
        let invocation = Invocation::new("echo", vec!["$(id)".into(), "a b".into()]);
        let output = SystemProcessRunner.run(&invocation).await.unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout), "$(id) a b\n");
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let invocation = Invocation::new("ipmitool-definitely-not-installed", Vec::new());
        let err = SystemProcessRunner.run(&invocation).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
