pub mod health;
pub mod ipmi;
pub mod presets;

pub use health::health;
pub use ipmi::{handle_ipmitool, method_not_allowed};
pub use presets::{
    fan_info, get_chassis_status, get_fru, get_lan, get_power_status, get_sel_info, get_sel_list,
    get_sensors, latest_sensors, set_fan_speed, set_power,
};
