use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Contact block of a shipper or recipient.
///
/// Keys the carrier accepts but we don't model (e.g. `emailAddress`) are kept
/// in `extra` and written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Postal address block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostalAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_lines: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_or_province_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residential: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A configured shipping-from location. `contact` and `address` must be
/// objects; everything else in the entry (e.g. `tins`) rides along in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub contact: Contact,
    pub address: PostalAddress,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Complete request body for `POST /ship/v1/shipments`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentPayload {
    pub label_response_options: String,
    pub requested_shipment: RequestedShipment,
    pub account_number: AccountNumber,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedShipment {
    pub total_declared_value: Money,
    /// Empty until an origin is resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipper: Option<Party>,
    /// Recipients are forwarded as supplied by the caller.
    pub recipients: Vec<Value>,
    pub ship_datestamp: String,
    pub service_type: String,
    pub packaging_type: String,
    pub pickup_type: String,
    pub block_insight_visibility: String,
    pub shipping_charges_payment: ShippingChargesPayment,
    pub label_specification: LabelSpecification,
    pub requested_package_line_items: Vec<PackageLineItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: u32,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingChargesPayment {
    pub payment_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSpecification {
    pub label_format_type: String,
    pub image_type: String,
    pub label_stock_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageLineItem {
    pub weight: Weight,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weight {
    pub value: u32,
    pub units: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountNumber {
    pub value: String,
}

/// OAuth token endpoint response (partial, only fields we need)
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
}

/// Bearer credential returned by the carrier's token endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn party_uses_carrier_field_names() {
        let party: Party = serde_json::from_value(json!({
            "contact": {
                "personName": "Warehouse",
                "phoneNumber": "2065550100"
            },
            "address": {
                "streetLines": ["1 Pike St"],
                "city": "Seattle",
                "stateOrProvinceCode": "WA",
                "postalCode": "98101",
                "countryCode": "US"
            }
        }))
        .unwrap();

        assert_eq!(party.contact.company_name, None);
        assert_eq!(party.address.residential, None);

        let back = serde_json::to_value(&party).unwrap();
        assert_eq!(back["address"]["stateOrProvinceCode"], "WA");
        assert!(back["contact"].get("companyName").is_none());
        assert!(back["address"].get("residential").is_none());
    }

    #[test]
    fn unmodelled_keys_survive_round_trip() {
        let entry = json!({
            "contact": {
                "personName": "Dock",
                "emailAddress": "dock@example.com"
            },
            "address": {
                "streetLines": ["1 Pike St", "Suite 200"],
                "city": "Seattle",
                "countryCode": "US",
                "geographicCoordinates": "47.61,-122.34"
            },
            "tins": [{ "number": "123456789", "tinType": "BUSINESS_NATIONAL" }]
        });

        let party: Party = serde_json::from_value(entry.clone()).unwrap();
        assert_eq!(party.contact.phone_number, None);
        assert_eq!(party.contact.extra["emailAddress"], "dock@example.com");

        assert_eq!(serde_json::to_value(&party).unwrap(), entry);
    }

    #[test]
    fn contact_and_address_must_be_objects() {
        let err = serde_json::from_value::<Party>(json!({ "contact": "Dock", "address": {} }));
        assert!(err.is_err());
        assert!(serde_json::from_value::<Party>(json!({ "contact": {} })).is_err());
    }

    #[test]
    fn blank_token_is_detected() {
        assert!(AccessToken::new("").is_blank());
        assert!(AccessToken::new("  ").is_blank());
        assert!(!AccessToken::new("abc123").is_blank());
    }
}
