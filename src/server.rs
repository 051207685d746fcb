use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Request, State},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::auth::{AuthError, LoginGate};
use crate::error::CarrierError;
use crate::workflow::ShipmentWorkflow;

#[derive(Clone)]
pub struct AppState {
    workflow: Arc<ShipmentWorkflow>,
    valid_origins: Arc<Vec<String>>,
    gate: Option<Arc<LoginGate>>,
}

impl AppState {
    pub fn new(
        workflow: ShipmentWorkflow,
        valid_origins: Vec<String>,
        gate: Option<LoginGate>,
    ) -> Self {
        Self {
            workflow: Arc::new(workflow),
            valid_origins: Arc::new(valid_origins),
            gate: gate.map(Arc::new),
        }
    }
}

/// JSON error envelope: `{"error": "<message>"}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<CarrierError> for ApiError {
    fn from(err: CarrierError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let status = match err {
            AuthError::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api", get(api_docs))
        .route("/api/fedex/ship", post(create_shipment));

    let Some(gate) = state.gate.clone() else {
        return api.with_state(state);
    };

    let login_routes: Router = Router::new()
        .route("/api/login", post(login))
        .with_state(gate.clone());

    let gated: Router = api
        .route_layer(middleware::from_fn_with_state(gate, require_bearer))
        .with_state(state);

    gated.merge(login_routes)
}

async fn require_bearer(
    State(gate): State<Arc<LoginGate>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    gate.verify_header(header)?;
    Ok(next.run(request).await)
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

async fn login(State(gate): State<Arc<LoginGate>>, body: Bytes) -> Result<Response, ApiError> {
    let credentials: LoginRequest = serde_json::from_slice(&body)
        .map_err(|_| ApiError::bad_request("Missing required fields: username, password"))?;

    let token = gate.login(&credentials.username, &credentials.password)?;

    Ok(Json(json!({
        "access_token": token,
        "token_type": "Bearer",
        "expires_in": gate.expires_secs(),
    }))
    .into_response())
}

async fn create_shipment(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request = match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(map)) if !map.is_empty() => map,
        _ => return Err(ApiError::bad_request("Missing request body")),
    };

    let (origin, recipients) = required_fields(&request)?;

    if !state.valid_origins.iter().any(|valid| valid == origin) {
        return Err(ApiError::bad_request(format!(
            "Invalid origin. Must be one of: {}",
            state.valid_origins.join(", ")
        )));
    }

    let result = state.workflow.submit(origin, recipients.clone()).await?;
    Ok((StatusCode::OK, Json(result)).into_response())
}

fn required_fields(request: &Map<String, Value>) -> Result<(&str, &Value), ApiError> {
    let origin = request
        .get("origin")
        .and_then(Value::as_str)
        .filter(|origin| !origin.trim().is_empty());
    let recipients = request.get("recipients").filter(|value| is_present(value));

    match (origin, recipients) {
        (Some(origin), Some(recipients)) => Ok((origin, recipients)),
        (origin, recipients) => {
            let missing: Vec<&str> = [
                ("origin", origin.is_none()),
                ("recipients", recipients.is_none()),
            ]
            .into_iter()
            .filter_map(|(field, absent)| absent.then_some(field))
            .collect();
            Err(ApiError::bad_request(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )))
        }
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Number(_) => true,
    }
}

async fn api_docs() -> Json<Value> {
    tracing::debug!("Fetching API documentation");

    Json(json!({
        "version": "1.0.0",
        "endpoints": {
            "fedex": {
                "ship": {
                    "method": "POST",
                    "endpoint": "/api/fedex/ship",
                    "description": "Create a FedEx shipment",
                    "request": {
                        "content_type": "application/json",
                        "schema": {
                            "origin": {
                                "type": "string",
                                "description": "Valid shipping origin location",
                                "required": true
                            },
                            "recipients": {
                                "type": "object",
                                "required": true,
                                "properties": {
                                    "contact": {
                                        "personName": "string",
                                        "phoneNumber": "string",
                                        "companyName": "string"
                                    },
                                    "address": {
                                        "streetLines": ["string"],
                                        "city": "string",
                                        "stateOrProvinceCode": "string",
                                        "postalCode": "string",
                                        "countryCode": "string",
                                        "residential": "boolean"
                                    }
                                }
                            }
                        }
                    },
                    "responses": {
                        "200": "Successful shipment creation",
                        "400": "Invalid request",
                        "500": "Internal server error"
                    }
                }
            }
        }
    }))
}
