//! Fixed-purpose endpoints backing the dashboard panels.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use super::ipmi::{reply, ApiReply};
use crate::control::fan::{fan_info_request, fan_sensors, fan_speed_request};
use crate::control::power::{power_status_request, PowerAction};
use crate::control::presets::{
    chassis_status_request, fru_list_request, lan_print_request, sel_info_request,
    sel_list_request, sensor_request,
};
use crate::ipmi::{Execution, GatewayError, IpmiResponse, SubcommandRequest};
use crate::poller::SensorSnapshot;
use crate::routes::AppState;

async fn run(state: &AppState, request: SubcommandRequest) -> ApiReply {
    reply(state.gateway.execute(&request).await)
}

pub async fn get_sensors(State(state): State<AppState>) -> ApiReply {
    run(&state, sensor_request()).await
}

pub async fn latest_sensors(
    State(state): State<AppState>,
) -> Result<Json<SensorSnapshot>, ApiReply> {
    state.poller.latest().await.map(Json).ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(IpmiResponse::failure("No sensor snapshot available yet")),
        )
    })
}

pub async fn get_chassis_status(State(state): State<AppState>) -> ApiReply {
    run(&state, chassis_status_request()).await
}

pub async fn get_power_status(State(state): State<AppState>) -> ApiReply {
    run(&state, power_status_request()).await
}

pub async fn set_power(State(state): State<AppState>, Path(action): Path<String>) -> ApiReply {
    match action.parse::<PowerAction>() {
        Ok(action) => {
            info!("Power action requested: {}", action);
            run(&state, action.request()).await
        }
        Err(e) => reply(Err(e)),
    }
}

pub async fn get_sel_list(State(state): State<AppState>) -> ApiReply {
    run(&state, sel_list_request()).await
}

pub async fn get_sel_info(State(state): State<AppState>) -> ApiReply {
    run(&state, sel_info_request()).await
}

pub async fn get_fru(State(state): State<AppState>) -> ApiReply {
    run(&state, fru_list_request()).await
}

pub async fn get_lan(State(state): State<AppState>) -> ApiReply {
    run(&state, lan_print_request()).await
}

pub async fn fan_info(State(state): State<AppState>) -> ApiReply {
    let result = state.gateway.execute(&fan_info_request()).await.map(|execution| match execution {
        Execution::Parsed(data) => Execution::Parsed(fan_sensors(data)),
        fallback => fallback,
    });
    reply(result)
}

#[derive(Debug, Deserialize)]
pub struct FanSpeedBody {
    pub percent: u64,
}

pub async fn set_fan_speed(
    State(state): State<AppState>,
    body: Result<Json<FanSpeedBody>, JsonRejection>,
) -> ApiReply {
    let percent = match body {
        Ok(Json(body)) => body.percent,
        Err(_) => {
            return reply(Err(GatewayError::InvalidInput(
                "Missing or invalid percent".to_string(),
            )))
        }
    };
    match fan_speed_request(percent) {
        Ok(request) => run(&state, request).await,
        Err(e) => reply(Err(e)),
    }
}
