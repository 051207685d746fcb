use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::addresses::{AddressBook, OriginTable};
use crate::config::Config;
use crate::error::{CarrierError, Result};
use crate::models::{AccessToken, ShipmentPayload, TokenResponse};
use crate::payload;

/// The three steps of a shipment request, in the order they run.
#[async_trait]
pub trait Carrier: Send + Sync {
    async fn generate_access_token(&self) -> Result<AccessToken>;

    fn populate_payload(&self, origin: &str, recipient: Value) -> Result<ShipmentPayload>;

    async fn create_shipment(
        &self,
        token: &AccessToken,
        payload: &ShipmentPayload,
    ) -> Result<Value>;
}

pub struct FedexClient {
    client_id: String,
    client_secret: String,
    base_url: String,
    account_number: String,
    addresses: AddressBook,
    http_client: Client,
}

impl FedexClient {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_addresses(config, AddressBook::new(config.address_file.clone()))
    }

    /// Every outbound call is bounded by `config.request_timeout`.
    pub fn with_addresses(config: &Config, addresses: AddressBook) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                CarrierError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            base_url: config.base_url.clone(),
            account_number: config.account_number.clone(),
            addresses,
            http_client,
        })
    }

    pub fn load_origin_table(&self) -> Result<&OriginTable> {
        self.addresses.table()
    }

    pub fn addresses(&self) -> &AddressBook {
        &self.addresses
    }

    /// Template for today's shipment with empty shipper and recipient slots.
    pub fn build_base_payload(&self) -> ShipmentPayload {
        payload::base_payload(&self.account_number, chrono::Local::now().date_naive())
    }

    pub async fn generate_access_token(&self) -> Result<AccessToken> {
        let url = format!("{}/oauth/token", self.base_url);
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        tracing::debug!("Generating access token");

        let response = self
            .http_client
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| auth_failure(None, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(auth_failure(
                Some(status.as_u16()),
                format!("token endpoint returned status {}: {}", status, body),
            ));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| auth_failure(None, format!("unreadable token response: {e}")))?;

        match token.access_token {
            Some(token) if !token.trim().is_empty() => Ok(AccessToken::new(token)),
            _ => Err(auth_failure(None, "response has no access_token".to_string())),
        }
    }

    pub fn populate_payload(&self, origin: &str, recipient: Value) -> Result<ShipmentPayload> {
        let table = self.load_origin_table()?;

        let Some(shipper) = table.get(origin) else {
            return Err(CarrierError::InvalidOrigin {
                origin: origin.to_string(),
                allowed: table.keys().cloned().collect(),
            });
        };

        tracing::debug!(origin, "Populating shipment payload");

        let mut payload = self.build_base_payload();
        payload.requested_shipment.shipper = Some(shipper.clone());
        payload.requested_shipment.recipients = vec![recipient];

        Ok(payload)
    }

    pub async fn create_shipment(
        &self,
        token: &AccessToken,
        payload: &ShipmentPayload,
    ) -> Result<Value> {
        if token.is_blank() {
            return Err(CarrierError::Validation("Access token required".to_string()));
        }

        let url = format!("{}/ship/v1/shipments", self.base_url);

        tracing::debug!("Creating FedEx shipment");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(token.as_str())
            .json(payload)
            .send()
            .await
            .map_err(|e| shipment_failure(None, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(shipment_failure(
                Some(status.as_u16()),
                format!("Shipment API returned status {}: {}", status, body),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| shipment_failure(None, format!("unreadable shipment response: {e}")))
    }
}

#[async_trait]
impl Carrier for FedexClient {
    async fn generate_access_token(&self) -> Result<AccessToken> {
        FedexClient::generate_access_token(self).await
    }

    fn populate_payload(&self, origin: &str, recipient: Value) -> Result<ShipmentPayload> {
        FedexClient::populate_payload(self, origin, recipient)
    }

    async fn create_shipment(
        &self,
        token: &AccessToken,
        payload: &ShipmentPayload,
    ) -> Result<Value> {
        FedexClient::create_shipment(self, token, payload).await
    }
}

fn auth_failure(status: Option<u16>, detail: String) -> CarrierError {
    CarrierError::Authentication { status, detail }
}

fn shipment_failure(status: Option<u16>, detail: String) -> CarrierError {
    CarrierError::ShipmentCreation { status, detail }
}
