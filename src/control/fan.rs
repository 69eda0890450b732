//! Fan speed translation - maps a UI percentage (0-100) onto the BMC's raw
//! duty-cycle byte and builds the OEM `raw` command that applies it.

use crate::ipmi::{GatewayError, IpmiCommand, IpmiData, SensorRecord, SubcommandRequest};

/// Fixed OEM preamble: manual fan control, all fans.
pub const FAN_SPEED_PREAMBLE: [&str; 4] = ["0x30", "0x30", "0x02", "0xff"];

/// Highest duty-cycle byte the controller accepts (100%).
pub const MAX_DUTY_CYCLE: u32 = 0x60;

/// Sensor queried for the current fan state.
pub const FAN_SENSOR: &str = "FAN1";

/// 50% -> round(50 * 96 / 100) = 48 -> "30".
///
/// Rounds half up in integer arithmetic. Does not clamp: callers validate the range.
pub fn map_fan_speed_to_raw(percent: u8) -> String {
    let mapped = (u32::from(percent) * MAX_DUTY_CYCLE + 50) / 100;
    format!("{:02x}", mapped)
}

/// `raw 0x30 0x30 0x02 0xff 0x<hex>` for a percentage in 0..=100.
pub fn fan_speed_request(percent: u64) -> Result<SubcommandRequest, GatewayError> {
    let percent = u8::try_from(percent)
        .ok()
        .filter(|p| *p <= 100)
        .ok_or_else(|| {
            GatewayError::InvalidInput(format!(
                "Invalid fan speed: {}. Must be between 0-100",
                percent
            ))
        })?;

    let mut args: Vec<String> = FAN_SPEED_PREAMBLE.iter().map(|s| s.to_string()).collect();
    args.push(format!("0x{}", map_fan_speed_to_raw(percent)));
    Ok(SubcommandRequest::new(IpmiCommand::Raw, args))
}

pub fn fan_info_request() -> SubcommandRequest {
    SubcommandRequest::new(IpmiCommand::Sensor, ["get", FAN_SENSOR])
}

/// Keep only sensor rows whose name mentions a fan. Raw rows have no name and are dropped.
pub fn fan_sensors(data: IpmiData) -> IpmiData {
    match data {
        IpmiData::Sensors(records) => IpmiData::Sensors(
            records
                .into_iter()
                .filter(|record: &SensorRecord| {
                    record.name().is_some_and(|name| name.to_lowercase().contains("fan"))
                })
                .collect(),
        ),
        other => other,
    }
}
