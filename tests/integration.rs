use std::io::Write;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use httpmock::prelude::*;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use fedex_shipper::carrier::FedexClient;
use fedex_shipper::config::Config;
use fedex_shipper::error::CarrierError;
use fedex_shipper::server::{AppState, router};
use fedex_shipper::workflow::ShipmentWorkflow;

const TRACKING_NUMBER: &str = "794953535000";

fn address_file() -> tempfile::NamedTempFile {
    let table = json!({
        "Seattle": {
            "contact": {
                "personName": "Seattle Warehouse",
                "phoneNumber": "2065550100",
                "companyName": "Acme Outdoor"
            },
            "address": {
                "streetLines": ["1 Pike St"],
                "city": "Seattle",
                "stateOrProvinceCode": "WA",
                "postalCode": "98101",
                "countryCode": "US",
                "residential": false
            }
        },
        "Provo": {
            "contact": {
                "personName": "Provo Warehouse",
                "phoneNumber": "8015550100"
            },
            "address": {
                "streetLines": ["100 N University Ave"],
                "city": "Provo",
                "stateOrProvinceCode": "UT",
                "postalCode": "84601",
                "countryCode": "US",
                "residential": false
            }
        }
    });

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(table.to_string().as_bytes()).unwrap();
    file
}

fn config(base_url: &str, address_file: &tempfile::NamedTempFile) -> Config {
    let address_path = address_file.path().to_string_lossy().into_owned();
    let base_url = base_url.to_string();
    Config::from_lookup(move |key| match key {
        "FEDEX_CLIENT_ID" => Some("test-client".to_string()),
        "FEDEX_CLIENT_SECRET" => Some("test-secret".to_string()),
        "FEDEX_BASE_URL" => Some(base_url.clone()),
        "FEDEX_ACCOUNT_NUMBER" => Some("740561073".to_string()),
        "FEDEX_ADDRESS_FILE" => Some(address_path.clone()),
        _ => None,
    })
    .unwrap()
}

fn app(config: &Config) -> Router {
    let client = FedexClient::new(config).unwrap();
    client.addresses().ensure_origins(&config.valid_origins).unwrap();

    router(AppState::new(
        ShipmentWorkflow::new(Arc::new(client)),
        config.valid_origins.clone(),
        None,
    ))
}

fn ship_request(origin: &str) -> Request<Body> {
    let body = json!({
        "origin": origin,
        "recipients": {
            "contact": {
                "personName": "Jane Doe",
                "phoneNumber": "3125550100"
            },
            "address": {
                "streetLines": ["233 S Wacker Dr"],
                "city": "Chicago",
                "stateOrProvinceCode": "IL",
                "postalCode": "60606",
                "countryCode": "US",
                "residential": true
            }
        }
    });

    Request::builder()
        .method("POST")
        .uri("/api/fedex/ship")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn ship_from_seattle_end_to_end() {
    let server = MockServer::start();
    let addresses = address_file();
    let config = config(&server.base_url(), &addresses);

    let token_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/oauth/token")
            .header("content-type", "application/x-www-form-urlencoded")
            .body_includes("grant_type=client_credentials");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"access_token":"abc123","token_type":"bearer","expires_in":3599}"#);
    });

    let ship_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/ship/v1/shipments")
            .header("authorization", "Bearer abc123")
            .body_includes(r#""city":"Seattle""#)
            .body_includes(r#""city":"Chicago""#)
            .body_includes(r#""accountNumber":{"value":"740561073"}"#);
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "transactionId": "b3a2f1e0",
                "output": {
                    "transactionShipments": [{
                        "masterTrackingNumber": TRACKING_NUMBER,
                        "serviceType": "GROUND_HOME_DELIVERY"
                    }]
                }
            }));
    });

    let (status, body) = send(app(&config), ship_request("Seattle")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["output"]["transactionShipments"][0]["masterTrackingNumber"],
        TRACKING_NUMBER
    );
    token_mock.assert_calls(1);
    ship_mock.assert_calls(1);
}

#[tokio::test]
async fn unconfigured_origin_never_reaches_carrier() {
    let server = MockServer::start();
    let addresses = address_file();
    let config = config(&server.base_url(), &addresses);

    let any_call = server.mock(|when, then| {
        when.any_request();
        then.status(200).body("{}");
    });

    let (status, body) = send(app(&config), ship_request("Chicago")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid origin. Must be one of: Seattle, Provo");
    any_call.assert_calls(0);
}

#[tokio::test]
async fn rejected_credentials_surface_as_500() {
    let server = MockServer::start();
    let addresses = address_file();
    let config = config(&server.base_url(), &addresses);

    let token_mock = server.mock(|when, then| {
        when.method(POST).path("/oauth/token");
        then.status(401)
            .header("content-type", "application/json")
            .body(r#"{"errors":[{"code":"NOT.AUTHORIZED.ERROR","message":"Invalid client"}]}"#);
    });
    let ship_mock = server.mock(|when, then| {
        when.method(POST).path("/ship/v1/shipments");
        then.status(200).body("{}");
    });

    let (status, body) = send(app(&config), ship_request("Provo")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("Failed to generate access token")
    );
    token_mock.assert_calls(1);
    ship_mock.assert_calls(0);
}

#[tokio::test]
async fn carrier_outage_surfaces_as_500() {
    let server = MockServer::start();
    let addresses = address_file();
    let config = config(&server.base_url(), &addresses);

    server.mock(|when, then| {
        when.method(POST).path("/oauth/token");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"access_token":"abc123"}"#);
    });
    server.mock(|when, then| {
        when.method(POST).path("/ship/v1/shipments");
        then.status(500).body("SYSTEM.UNEXPECTED.ERROR");
    });

    let (status, body) = send(app(&config), ship_request("Seattle")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("Failed to create shipment"));
    assert!(message.contains("SYSTEM.UNEXPECTED.ERROR"));
}

#[test]
fn origin_set_mismatch_is_refused_at_startup() {
    let addresses = address_file();
    let mut config = config("http://127.0.0.1:9", &addresses);
    config.valid_origins = vec!["Seattle".to_string(), "Chicago".to_string()];

    let client = FedexClient::new(&config).unwrap();
    let err = client
        .addresses()
        .ensure_origins(&config.valid_origins)
        .unwrap_err();

    assert!(matches!(err, CarrierError::Configuration(_)));
}

#[test]
fn missing_address_file_is_a_configuration_error() {
    let addresses = address_file();
    let mut config = config("http://127.0.0.1:9", &addresses);
    config.address_file = "/nonexistent/fedex/address.json".into();

    let client = FedexClient::new(&config).unwrap();
    assert!(matches!(
        client.load_origin_table(),
        Err(CarrierError::Configuration(_))
    ));
}
