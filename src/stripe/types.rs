use std::collections::HashMap;

use color_eyre::eyre::{Context, Result, eyre};
use serde::Deserialize;

pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

#[derive(Debug, Clone, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub client_reference_id: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    /// Total charged, in the currency's minor unit.
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
}

impl StripeEvent {
    pub fn from_slice(payload: &[u8]) -> Result<Self> {
        serde_json::from_slice(payload).wrap_err("Failed to parse Stripe event")
    }

    /// The event's object as a checkout session, if that is what the event carries.
    pub fn checkout_session(&self) -> Result<Option<CheckoutSession>> {
        if self.event_type != CHECKOUT_SESSION_COMPLETED {
            return Ok(None);
        }
        let session = serde_json::from_value(self.data.object.clone())
            .wrap_err(format!("Event {} has a malformed checkout session", self.id))?;
        Ok(Some(session))
    }
}

impl CheckoutSession {
    /// Our user id, from `client_reference_id` or else `metadata.user_id`.
    pub fn user_id(&self) -> Result<i64> {
        let raw = self
            .client_reference_id
            .as_deref()
            .or_else(|| self.metadata.get("user_id").map(String::as_str))
            .ok_or(eyre!("Checkout session {} carries no user reference", self.id))?;
        raw.trim()
            .parse()
            .wrap_err(format!("Checkout session {} has an invalid user reference: {raw}", self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_checkout_completed() {
        let payload = br#"{
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": {"object": {
                "id": "cs_test_1",
                "client_reference_id": "42",
                "amount_total": 999,
                "currency": "usd"
            }}
        }"#;
        let event = StripeEvent::from_slice(payload).unwrap();
        let session = event.checkout_session().unwrap().unwrap();
        assert_eq!(session.id, "cs_test_1");
        assert_eq!(session.user_id().unwrap(), 42);
        assert_eq!(session.amount_total, Some(999));
    }

    #[test]
    fn test_user_id_falls_back_to_metadata() {
        let payload = br#"{
            "id": "evt_2",
            "type": "checkout.session.completed",
            "data": {"object": {"id": "cs_2", "metadata": {"user_id": "7"}}}
        }"#;
        let session = StripeEvent::from_slice(payload)
            .unwrap()
            .checkout_session()
            .unwrap()
            .unwrap();
        assert_eq!(session.user_id().unwrap(), 7);
    }

    #[test]
    fn test_missing_user_reference_is_an_error() {
        let session = CheckoutSession {
            id: "cs_3".to_string(),
            client_reference_id: None,
            metadata: HashMap::new(),
            amount_total: None,
            currency: None,
        };
        assert!(session.user_id().is_err());
    }

    #[test]
    fn test_other_event_types_have_no_session() {
        let payload = br#"{"id":"evt_3","type":"invoice.paid","data":{"object":{"id":"in_1"}}}"#;
        let event = StripeEvent::from_slice(payload).unwrap();
        assert!(event.checkout_session().unwrap().is_none());
    }
}
