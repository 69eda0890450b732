//! Generic gateway endpoint: `POST /api/ipmitool`.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::ipmi::{Execution, GatewayError, IpmiRequest, IpmiResponse};
use crate::routes::AppState;

pub type ApiReply = (StatusCode, Json<IpmiResponse>);

/// Map a gateway outcome to status code and body. Soft parse failures are 200.
pub fn reply(result: Result<Execution, GatewayError>) -> ApiReply {
    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(e) => e.status_code(),
    };
    (status, Json(result.into()))
}

pub async fn handle_ipmitool(
    State(state): State<AppState>,
    body: Result<Json<IpmiRequest>, JsonRejection>,
) -> ApiReply {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return reply(Err(GatewayError::InvalidInput(rejection.body_text())));
        }
    };
    reply(state.gateway.execute_request(request).await)
}

pub async fn method_not_allowed() -> ApiReply {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(IpmiResponse::failure("Method not allowed")),
    )
}
