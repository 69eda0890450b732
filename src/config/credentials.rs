//! BMC connection credentials, read at call time.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::ipmi::GatewayError;

pub const HOST_VAR: &str = "IDRAC_IP";
pub const USERNAME_VAR: &str = "IDRAC_USERNAME";
pub const PASSWORD_VAR: &str = "IDRAC_PASSWORD";

#[derive(Clone, PartialEq, Eq)]
pub struct BmcCredentials {
    pub host: String,
    pub username: String,
    pub password: String,
}

// Password stays out of Debug output (and therefore out of logs).
impl fmt::Debug for BmcCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BmcCredentials")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"****")
            .finish()
    }
}

type Lookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Where credentials come from. Resolved on every request so that a changed
/// environment is picked up without a restart.
#[derive(Clone)]
pub struct CredentialSource {
    lookup: Lookup,
}

impl CredentialSource {
    /// Read `IDRAC_IP`, `IDRAC_USERNAME` and `IDRAC_PASSWORD` from the process environment.
    pub fn environment() -> Self {
        Self { lookup: Arc::new(|name| std::env::var(name).ok()) }
    }

    /// Fixed variable table, keyed by the same variable names.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let table: HashMap<String, String> =
            pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { lookup: Arc::new(move |name| table.get(name).cloned()) }
    }

    fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.is_empty())
    }

    /// Names of the variables that are unset or empty.
    pub fn missing(&self) -> Vec<&'static str> {
        [HOST_VAR, USERNAME_VAR, PASSWORD_VAR]
            .into_iter()
            .filter(|name| self.get(name).is_none())
            .collect()
    }

    pub fn resolve(&self) -> Result<BmcCredentials, GatewayError> {
        match (self.get(HOST_VAR), self.get(USERNAME_VAR), self.get(PASSWORD_VAR)) {
            (Some(host), Some(username), Some(password)) => {
                Ok(BmcCredentials { host, username, password })
            }
            _ => Err(GatewayError::ConfigurationMissing { missing: self.missing().join(", ") }),
        }
    }
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSource").field("missing", &self.missing()).finish()
    }
}
