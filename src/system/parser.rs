//! ipmitool text output parser.
//! Converts `sensor`/`sdr` tables and `chassis status` key/value listings into
//! structured records; everything else is split into lines.

use thiserror::Error;

use crate::ipmi::{ChassisStatus, IpmiCommand, IpmiData, SensorRecord};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("stdout is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// Pick the output shape from the subcommand and its (unsanitized) arguments.
pub fn parse_output(
    command: IpmiCommand,
    args: &[String],
    stdout: &[u8],
) -> Result<IpmiData, ParseError> {
    let text = std::str::from_utf8(stdout)?.trim();

    let data = if command.lists_sensors() {
        IpmiData::Sensors(parse_sensor_table(text))
    } else if command == IpmiCommand::Chassis && args.iter().any(|a| a == "status") {
        IpmiData::Chassis(parse_chassis_status(text))
    } else {
        IpmiData::Lines(split_lines(text))
    };

    Ok(data)
}

/// Parse one row of `ipmitool sensor` output.
/// Input:  "CPU Temp | 45.000 | degrees C | ok | na | 3.000"
/// Fewer than three fields yields a `Raw` record.
pub fn parse_sensor_line(line: &str) -> SensorRecord {
    let line = line.trim();
    let fields: Vec<&str> = line.split('|').map(str::trim).collect();

    if fields.len() >= 3 {
        SensorRecord::Reading {
            name: fields[0].to_string(),
            value: fields[1].to_string(),
            status: fields[2].to_string(),
            details: fields[3..].join(" ").trim().to_string(),
        }
    } else {
        SensorRecord::Raw { raw: line.to_string() }
    }
}

/// Blank lines are dropped; all others become a record in source order.
pub fn parse_sensor_table(text: &str) -> Vec<SensorRecord> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_sensor_line)
        .collect()
}

/// "System Power         : on" -> ("System Power", "on").
/// Requires text on both sides of the first colon; "Key:" alone does not match.
pub fn parse_key_value_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim_end_matches('\r');
    let (key, value) = line.split_once(':')?;
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key.trim(), value.trim()))
}

/// Lines without a key/value shape are skipped. A repeated key overwrites the
/// earlier value.
pub fn parse_chassis_status(text: &str) -> ChassisStatus {
    let mut status = ChassisStatus::default();
    for (key, value) in text.lines().filter_map(parse_key_value_line) {
        status.insert(key, value);
    }
    status
}

/// Default shape: every line, trimmed, in order. Empty output yields no lines.
pub fn split_lines(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n').map(|line| line.trim().to_string()).collect()
}
