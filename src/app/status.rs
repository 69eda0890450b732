//! `--check`: verify the dashboard can reach ipmitool and has BMC credentials.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::credentials::{CredentialSource, HOST_VAR, PASSWORD_VAR, USERNAME_VAR};
use crate::config::persistence::config_exists;
use crate::config::types::DashboardConfig;

/// Resolve `tool` the way the process spawn will: paths as-is, bare names via `PATH`.
pub fn find_tool(tool: &str) -> Option<PathBuf> {
    let path = Path::new(tool);
    if path.components().count() > 1 {
        return path.is_file().then(|| path.to_path_buf());
    }
    std::env::var_os("PATH").and_then(|paths| {
        std::env::split_paths(&paths)
            .map(|dir| dir.join(tool))
            .find(|candidate| candidate.is_file())
    })
}

/// Print a checklist and return whether every check passed.
pub fn run_health_check(
    config: &DashboardConfig,
    config_path: &Path,
    credentials: &CredentialSource,
) -> Result<bool> {
    println!("\x1b[32mipmi-dashboard v{} ({})\x1b[0m", env!("CARGO_PKG_VERSION"), std::env::consts::ARCH);
    println!("Health Check");
    println!("============\n");

    let mut all_ok = true;

    if config_exists(config_path) {
        println!("✓ Config file: {}", config_path.display());
    } else {
        println!("⚠ Config file: {} not found (using defaults)", config_path.display());
    }

    match find_tool(&config.ipmi.tool) {
        Some(path) => println!("✓ {}: {}", config.ipmi.tool, path.display()),
        None => {
            println!("✗ {}: NOT FOUND", config.ipmi.tool);
            println!("  Install ipmitool or set ipmi.tool in the config file");
            all_ok = false;
        }
    }

    let missing = credentials.missing();
    for var in [HOST_VAR, USERNAME_VAR, PASSWORD_VAR] {
        if missing.contains(&var) {
            println!("✗ {}: not set", var);
            all_ok = false;
        } else {
            println!("✓ {}: set", var);
        }
    }

    println!();
    if all_ok {
        println!("\x1b[32m✓ All checks passed!\x1b[0m");
    } else {
        println!("\x1b[33m⚠ Some issues found - see above\x1b[0m");
    }

    Ok(all_ok)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn finds_tools_on_path_and_by_absolute_path() {
        assert!(find_tool("sh").is_some());
        assert!(find_tool("/bin/sh").is_some());
        assert!(find_tool("ipmitool-definitely-not-installed").is_none());
    }

    #[test]
    fn missing_credentials_fail_the_check() {
        let ok = run_health_check(
            &DashboardConfig::default(),
            Path::new("/nonexistent/config.json"),
            &CredentialSource::from_pairs([(HOST_VAR, "10.0.0.5")]),
        )
        .unwrap();
        assert!(!ok);
    }
}
