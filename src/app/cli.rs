//! Command-line argument definitions (clap).

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "ipmi-dashboard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "BMC dashboard backend - inspect and control a server over IPMI", long_about = None)]
pub struct Args {
    // === Server ===
    /// Run the HTTP API server
    #[arg(short = 's', long, help_heading = "Server")]
    pub serve: bool,

    /// Address to bind (overrides config)
    #[arg(long, help_heading = "Server")]
    pub bind: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short = 'p', long, help_heading = "Server")]
    pub port: Option<u16>,

    /// Disable the background sensor poller
    #[arg(long = "no-poll", help_heading = "Server")]
    pub no_poll: bool,

    // === One-shot ===
    /// Run one allow-listed ipmitool subcommand and print the JSON response, e.g. `--exec chassis status`
    #[arg(short = 'x', long, num_args = 1.., allow_hyphen_values = true, value_name = "COMMAND", help_heading = "One-shot")]
    pub exec: Option<Vec<String>>,

    /// Set fan speed (0-100%) via the OEM raw command
    #[arg(long = "fan-speed", value_name = "PERCENT", help_heading = "One-shot")]
    pub fan_speed: Option<u64>,

    // === Config & Debug ===
    /// Path to config.json (default: next to the executable)
    #[arg(short = 'c', long = "config-file", help_heading = "Config & Debug")]
    pub config_file: Option<String>,

    /// Print the effective configuration and exit
    #[arg(long = "show-config", help_heading = "Config & Debug")]
    pub show_config: bool,

    /// Check ipmitool availability and BMC credentials
    #[arg(long, help_heading = "Config & Debug")]
    pub check: bool,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR, CRITICAL)
    #[arg(long = "log-level", help_heading = "Config & Debug")]
    pub log_level: Option<String>,
}

impl Args {
    pub fn has_command(&self) -> bool {
        self.serve || self.exec.is_some() || self.fan_speed.is_some() || self.show_config || self.check
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exec_collects_command_and_args() {
        let args = Args::try_parse_from(["ipmi-dashboard", "--exec", "sensor", "get", "FAN1"]).unwrap();
        assert_eq!(args.exec.unwrap(), vec!["sensor", "get", "FAN1"]);
    }

    #[test]
    fn no_flags_means_no_command() {
        let args = Args::try_parse_from(["ipmi-dashboard", "--log-level", "debug"]).unwrap();
        assert!(!args.has_command());
    }
}
