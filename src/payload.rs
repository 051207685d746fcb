use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::models::{
    AccountNumber, LabelSpecification, Money, PackageLineItem, RequestedShipment,
    ShipmentPayload, ShippingChargesPayment, Weight,
};

pub const DECLARED_AMOUNT: u32 = 1000;
pub const DECLARED_CURRENCY: &str = "USD";
pub const SERVICE_TYPE: &str = "GROUND_HOME_DELIVERY";
pub const PACKAGING_TYPE: &str = "YOUR_PACKAGING";
pub const PICKUP_TYPE: &str = "USE_SCHEDULED_PICKUP";
pub const PACKAGE_WEIGHT_LB: u32 = 5;

/// Static shipment shell for the given ship date.
///
/// The shipper slot is empty and the recipients list holds a single empty
/// object; both are filled by [`crate::carrier::FedexClient::populate_payload`].
pub fn base_payload(account_number: &str, ship_date: NaiveDate) -> ShipmentPayload {
    ShipmentPayload {
        label_response_options: "LABEL".to_string(),
        requested_shipment: RequestedShipment {
            total_declared_value: Money {
                amount: DECLARED_AMOUNT,
                currency: DECLARED_CURRENCY.to_string(),
            },
            shipper: None,
            recipients: vec![Value::Object(Map::new())],
            ship_datestamp: ship_date.format("%Y-%m-%d").to_string(),
            service_type: SERVICE_TYPE.to_string(),
            packaging_type: PACKAGING_TYPE.to_string(),
            pickup_type: PICKUP_TYPE.to_string(),
            block_insight_visibility: "false".to_string(),
            shipping_charges_payment: ShippingChargesPayment {
                payment_type: "SENDER".to_string(),
            },
            label_specification: LabelSpecification {
                label_format_type: "COMMON2D".to_string(),
                image_type: "ZPLII".to_string(),
                label_stock_type: "STOCK_4X6".to_string(),
            },
            requested_package_line_items: vec![PackageLineItem {
                weight: Weight {
                    value: PACKAGE_WEIGHT_LB,
                    units: "LB".to_string(),
                },
            }],
        },
        account_number: AccountNumber {
            value: account_number.to_string(),
        },
    }
}
