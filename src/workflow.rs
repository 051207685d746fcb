use std::sync::Arc;

use serde_json::Value;

use crate::carrier::Carrier;
use crate::error::Result;

/// Runs one shipment request: token, then payload, then submission.
///
/// Each step runs exactly once. The first failure aborts the sequence and is
/// returned unchanged.
pub struct ShipmentWorkflow {
    carrier: Arc<dyn Carrier>,
}

impl ShipmentWorkflow {
    pub fn new(carrier: Arc<dyn Carrier>) -> Self {
        Self { carrier }
    }

    pub async fn submit(&self, origin: &str, recipient: Value) -> Result<Value> {
        tracing::debug!(origin, "token requested");
        let token = self
            .carrier
            .generate_access_token()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "shipment failed at token exchange"))?;
        tracing::debug!("token obtained");

        let payload = self
            .carrier
            .populate_payload(origin, recipient)
            .inspect_err(|e| tracing::error!(error = %e, "shipment failed at payload assembly"))?;
        tracing::debug!(origin, "payload built");

        let result = self
            .carrier
            .create_shipment(&token, &payload)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "shipment failed at submission"))?;
        tracing::info!(origin, "shipment completed");

        Ok(result)
    }
}
