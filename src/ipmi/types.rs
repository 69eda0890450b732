//! Structured shapes produced from ipmitool output, and the response sent to the dashboard.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::error::GatewayError;

/// One row of `sensor` / `sdr` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SensorRecord {
    Reading {
        name: String,
        value: String,
        status: String,
        details: String,
    },
    /// Line with fewer than three `|`-separated fields.
    Raw { raw: String },
}

impl SensorRecord {
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Reading { name, .. } => Some(name),
            Self::Raw { .. } => None,
        }
    }
}

/// Ordered key/value pairs from `chassis status`.
///
/// Inserting an existing key replaces its value and keeps its first position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChassisStatus {
    entries: Vec<(String, String)>,
}

impl ChassisStatus {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }
}

#[cfg(test)]
impl ChassisStatus {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Serialize for ChassisStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Parsed stdout, shaped by the subcommand that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum IpmiData {
    Sensors(Vec<SensorRecord>),
    Chassis(ChassisStatus),
    Lines(Vec<String>),
    Raw(String),
}

/// Outcome of a successful process run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Execution {
    Parsed(IpmiData),
    /// The tool succeeded but its output could not be structured. The raw
    /// trimmed stdout is still delivered, together with a note.
    RawFallback { raw: String, note: String },
}

/// Wire response: `{ success, data?, error? }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpmiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<IpmiData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IpmiResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(message.into()) }
    }
}

impl From<Execution> for IpmiResponse {
    fn from(execution: Execution) -> Self {
        match execution {
            Execution::Parsed(data) => Self { success: true, data: Some(data), error: None },
            Execution::RawFallback { raw, note } => Self {
                success: true,
                data: Some(IpmiData::Raw(raw)),
                error: Some(note),
            },
        }
    }
}

impl From<&GatewayError> for IpmiResponse {
    fn from(err: &GatewayError) -> Self {
        Self::failure(err.to_string())
    }
}

impl From<Result<Execution, GatewayError>> for IpmiResponse {
    fn from(result: Result<Execution, GatewayError>) -> Self {
        match result {
            Ok(execution) => execution.into(),
            Err(err) => (&err).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sensor_records_serialize_flat() {
        let reading = SensorRecord::Reading {
            name: "CPU Temp".into(),
            value: "45 degrees C".into(),
            status: "ok".into(),
            details: String::new(),
        };
        assert_eq!(
            serde_json::to_value(&reading).unwrap(),
            json!({"name": "CPU Temp", "value": "45 degrees C", "status": "ok", "details": ""})
        );
        assert_eq!(
            serde_json::to_value(SensorRecord::Raw { raw: "junk".into() }).unwrap(),
            json!({"raw": "junk"})
        );
    }

    #[test]
    fn chassis_status_keeps_order_and_overwrites_in_place() {
        let mut status = ChassisStatus::default();
        status.insert("System Power", "on");
        status.insert("Power Overload", "false");
        status.insert("System Power", "off");

        assert_eq!(status.len(), 2);
        assert_eq!(status.get("System Power"), Some("off"));
        assert_eq!(
            serde_json::to_string(&status).unwrap(),
            r#"{"System Power":"off","Power Overload":"false"}"#
        );
    }

    #[test]
    fn raw_fallback_carries_data_and_error() {
        let response: IpmiResponse = Execution::RawFallback {
            raw: "\u{fffd}garbage".into(),
            note: "Could not parse output format".into(),
        }
        .into();
        assert!(response.success);
        assert_eq!(response.data, Some(IpmiData::Raw("\u{fffd}garbage".into())));
        assert_eq!(response.error.as_deref(), Some("Could not parse output format"));
    }

    #[test]
    fn failure_omits_data() {
        let response: IpmiResponse = (&GatewayError::Cancelled).into();
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"success": false, "error": "ipmitool invocation was cancelled"})
        );
    }
}
