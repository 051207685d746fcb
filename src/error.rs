use thiserror::Error;

/// Every failure the carrier client can surface.
///
/// Transport errors are flattened into `status` + `detail` so callers never
/// depend on the HTTP library's error types.
#[derive(Debug, Error)]
pub enum CarrierError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to generate access token: {detail}")]
    Authentication { status: Option<u16>, detail: String },

    #[error("Invalid origin: {origin}. Must be one of: {}", allowed.join(", "))]
    InvalidOrigin { origin: String, allowed: Vec<String> },

    #[error("{0}")]
    Validation(String),

    #[error("Failed to create shipment: {detail}")]
    ShipmentCreation { status: Option<u16>, detail: String },
}

impl CarrierError {
    /// True for errors caused by the caller's input rather than the carrier or setup.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidOrigin { .. } | Self::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, CarrierError>;
