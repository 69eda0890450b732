use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    fan_info, get_chassis_status, get_fru, get_lan, get_power_status, get_sel_info, get_sel_list,
    get_sensors, handle_ipmitool, health, latest_sensors, method_not_allowed, set_fan_speed,
    set_power,
};
use crate::ipmi::IpmiGateway;
use crate::poller::SensorPoller;

/// Shared handler state. Cloned per request; everything inside is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<IpmiGateway>,
    pub poller: Arc<SensorPoller>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/ipmitool", post(handle_ipmitool).fallback(method_not_allowed))
        .route("/api/sensors", get(get_sensors))
        .route("/api/sensors/latest", get(latest_sensors))
        .route("/api/chassis", get(get_chassis_status))
        .route("/api/power", get(get_power_status))
        .route("/api/power/:action", post(set_power))
        .route("/api/sel", get(get_sel_list))
        .route("/api/sel/info", get(get_sel_info))
        .route("/api/fru", get(get_fru))
        .route("/api/lan", get(get_lan))
        .route("/api/fans", get(fan_info))
        .route("/api/fans/speed", post(set_fan_speed))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::credentials::{CredentialSource, HOST_VAR, PASSWORD_VAR, USERNAME_VAR};
    use crate::config::types::IpmiSettings;
    use crate::system::executor::testing::ScriptedRunner;

    fn app_with(runner: Arc<ScriptedRunner>, credentials: CredentialSource) -> Router {
        let gateway = Arc::new(IpmiGateway::new(IpmiSettings::default(), credentials, runner));
        let poller = Arc::new(SensorPoller::new(Arc::clone(&gateway), Duration::from_secs(30)));
        create_router(AppState { gateway, poller })
    }

    fn app(runner: Arc<ScriptedRunner>) -> Router {
        app_with(
            runner,
            CredentialSource::from_pairs([
                (HOST_VAR, "10.0.0.5"),
                (USERNAME_VAR, "root"),
                (PASSWORD_VAR, "calvin"),
            ]),
        )
    }

    async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn chassis_status_over_http() {
        let runner = Arc::new(ScriptedRunner::stdout("System Power          : on\n"));
        let (status, body) = send(
            app(runner),
            Method::POST,
            "/api/ipmitool",
            Some(json!({"command": "chassis", "args": ["status"]})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "data": {"System Power": "on"}}));
    }

    #[tokio::test]
    async fn forbidden_command_is_403_without_spawn() {
        let runner = Arc::new(ScriptedRunner::stdout("unused"));
        let (status, body) = send(
            app(runner.clone()),
            Method::POST,
            "/api/ipmitool",
            Some(json!({"command": "mc", "args": ["reset", "cold"]})),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["success"], json!(false));
        assert!(body["error"].as_str().unwrap().contains("sdr, sensor, chassis"));
        assert_eq!(runner.spawns(), 0);
    }

    #[tokio::test]
    async fn missing_command_is_400() {
        let runner = Arc::new(ScriptedRunner::stdout("unused"));
        let (status, body) = send(app(runner), Method::POST, "/api/ipmitool", Some(json!({"args": []}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"success": false, "error": "Command is required"}));
    }

    #[tokio::test]
    async fn missing_configuration_is_500() {
        let runner = Arc::new(ScriptedRunner::stdout("unused"));
        let app = app_with(runner.clone(), CredentialSource::from_pairs([(HOST_VAR, "10.0.0.5")]));
        let (status, body) =
            send(app, Method::POST, "/api/ipmitool", Some(json!({"command": "sdr"}))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("IDRAC_USERNAME"));
        assert_eq!(runner.spawns(), 0);
    }

    #[tokio::test]
    async fn get_on_gateway_path_is_405() {
        let runner = Arc::new(ScriptedRunner::stdout("unused"));
        let (status, body) = send(app(runner), Method::GET, "/api/ipmitool", None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, json!({"success": false, "error": "Method not allowed"}));
    }

    #[tokio::test]
    async fn fan_speed_sends_raw_bytes() {
        let runner = Arc::new(ScriptedRunner::stdout(""));
        let (status, body) =
            send(app(runner.clone()), Method::POST, "/api/fans/speed", Some(json!({"percent": 100}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "data": []}));
        let invocation = runner.last_invocation().unwrap();
        assert_eq!(&invocation.args[8..], &["raw", "0x30", "0x30", "0x02", "0xff", "0x60"]);
    }

    #[tokio::test]
    async fn fan_speed_above_100_is_rejected() {
        let runner = Arc::new(ScriptedRunner::stdout(""));
        let (status, _) =
            send(app(runner.clone()), Method::POST, "/api/fans/speed", Some(json!({"percent": 150}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(runner.spawns(), 0);
    }

    #[tokio::test]
    async fn fans_endpoint_filters_to_fan_rows() {
        let runner = Arc::new(ScriptedRunner::stdout(
            "FAN1 | 3360.000 | RPM | ok\nInlet Temp | 23.000 | degrees C | ok\n",
        ));
        let (status, body) = send(app(runner), Method::GET, "/api/fans", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["data"],
            json!([{"name": "FAN1", "value": "3360.000", "status": "RPM", "details": "ok"}])
        );
    }

    #[tokio::test]
    async fn power_actions() {
        let runner = Arc::new(ScriptedRunner::stdout("Chassis Power Control: Cycle"));
        let (status, body) = send(app(runner.clone()), Method::POST, "/api/power/cycle", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!(["Chassis Power Control: Cycle"]));
        assert_eq!(&runner.last_invocation().unwrap().args[8..], &["power", "cycle"]);

        let (status, _) = send(app(runner.clone()), Method::POST, "/api/power/explode", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(runner.spawns(), 1);
    }

    #[tokio::test]
    async fn latest_sensors_unavailable_before_first_poll() {
        let runner = Arc::new(ScriptedRunner::stdout(""));
        let (status, body) = send(app(runner), Method::GET, "/api/sensors/latest", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["success"], json!(false));
    }

    #[tokio::test]
    async fn health_reports_version() {
        let runner = Arc::new(ScriptedRunner::stdout(""));
        let (status, body) = send(app(runner), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["version"], json!(env!("CARGO_PKG_VERSION")));
    }
}
