//! Read-only queries the dashboard issues on its own.

use crate::ipmi::{IpmiCommand, SubcommandRequest};

pub fn sensor_request() -> SubcommandRequest {
    SubcommandRequest::new(IpmiCommand::Sensor, Vec::<String>::new())
}

pub fn chassis_status_request() -> SubcommandRequest {
    SubcommandRequest::new(IpmiCommand::Chassis, ["status"])
}

pub fn sel_info_request() -> SubcommandRequest {
    SubcommandRequest::new(IpmiCommand::Sel, ["info"])
}

pub fn sel_list_request() -> SubcommandRequest {
    SubcommandRequest::new(IpmiCommand::Sel, ["list"])
}

pub fn fru_list_request() -> SubcommandRequest {
    SubcommandRequest::new(IpmiCommand::Fru, ["list"])
}

pub fn lan_print_request() -> SubcommandRequest {
    SubcommandRequest::new(IpmiCommand::Lan, ["print"])
}
