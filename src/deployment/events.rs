//! Market events that move a deployment's orders and leases.
//!
//! The chain reports order and lease changes as ABCI events on the
//! transaction (or block) that caused them. Two encodings are accepted:
//!
//! - typed events, e.g. `akash.market.v1.EventOrderCreated`, whose `id`
//!   attribute is the JSON-encoded identifier
//! - legacy `akash.v1` events carrying an `action` attribute
//!   (`order-created`, `lease-closed`, ...) and flat id attributes

use crate::types::{LeaseId, OrderId, TxEvent};
use serde_json::Value;

/// An order or lease lifecycle change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketEvent {
    OrderCreated(OrderId),
    OrderClosed(OrderId),
    LeaseCreated(LeaseId),
    LeaseClosed(LeaseId),
}

#[derive(Clone, Copy)]
enum Kind {
    OrderCreated,
    OrderClosed,
    LeaseCreated,
    LeaseClosed,
}

impl Kind {
    fn from_typed(kind: &str) -> Option<Self> {
        if !kind.starts_with("akash.market.") {
            return None;
        }
        match kind.rsplit('.').next()? {
            "EventOrderCreated" => Some(Kind::OrderCreated),
            "EventOrderClosed" => Some(Kind::OrderClosed),
            "EventLeaseCreated" => Some(Kind::LeaseCreated),
            "EventLeaseClosed" => Some(Kind::LeaseClosed),
            _ => None,
        }
    }

    fn from_action(action: &str) -> Option<Self> {
        match action {
            "order-created" => Some(Kind::OrderCreated),
            "order-closed" => Some(Kind::OrderClosed),
            "lease-created" => Some(Kind::LeaseCreated),
            "lease-closed" => Some(Kind::LeaseClosed),
            _ => None,
        }
    }
}

impl MarketEvent {
    /// Parse a market event. Anything else, or an event with a malformed
    /// id, yields `None`.
    pub fn from_tx_event(event: &TxEvent) -> Option<Self> {
        let kind = match Kind::from_typed(&event.kind) {
            Some(kind) => kind,
            None if event.kind == "akash.v1" => Kind::from_action(&unquote(event.attr("action")?))?,
            None => return None,
        };

        let fields = IdFields::from_event(event)?;
        let order = fields.order_id()?;

        Some(match kind {
            Kind::OrderCreated => MarketEvent::OrderCreated(order),
            Kind::OrderClosed => MarketEvent::OrderClosed(order),
            Kind::LeaseCreated => MarketEvent::LeaseCreated(LeaseId::new(&order, fields.provider?)),
            Kind::LeaseClosed => MarketEvent::LeaseClosed(LeaseId::new(&order, fields.provider?)),
        })
    }

    /// All market events in a transaction's event list, in order.
    pub fn collect(events: &[TxEvent]) -> Vec<Self> {
        events.iter().filter_map(Self::from_tx_event).collect()
    }
}

struct IdFields {
    owner: Option<String>,
    dseq: Option<u64>,
    gseq: Option<u32>,
    oseq: Option<u32>,
    provider: Option<String>,
}

impl IdFields {
    fn from_event(event: &TxEvent) -> Option<Self> {
        if let Some(raw) = event.attr("id") {
            let id: Value = serde_json::from_str(raw).ok()?;
            return Some(Self {
                owner: id.get("owner").and_then(Value::as_str).map(str::to_string),
                dseq: id.get("dseq").and_then(number),
                gseq: id.get("gseq").and_then(number).and_then(|n| u32::try_from(n).ok()),
                oseq: id.get("oseq").and_then(number).and_then(|n| u32::try_from(n).ok()),
                provider: id.get("provider").and_then(Value::as_str).map(str::to_string),
            });
        }

        let flat = |key: &str| event.attr(key).map(unquote);
        Some(Self {
            owner: flat("owner"),
            dseq: flat("dseq").and_then(|v| v.parse().ok()),
            gseq: flat("gseq").and_then(|v| v.parse().ok()),
            oseq: flat("oseq").and_then(|v| v.parse().ok()),
            provider: flat("provider"),
        })
    }

    fn order_id(&self) -> Option<OrderId> {
        Some(OrderId {
            owner: self.owner.clone()?,
            dseq: self.dseq?,
            gseq: self.gseq?,
            oseq: self.oseq?,
        })
    }
}

/// Proto JSON encodes 64-bit integers as strings.
fn number(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Typed-event attribute values are JSON, so strings arrive quoted.
fn unquote(v: &str) -> String {
    v.trim_matches('"').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: &str = "akash1owner";

    #[test]
    fn test_typed_order_created() {
        let ev = TxEvent::new("akash.market.v1.EventOrderCreated").with_attr(
            "id",
            r#"{"owner":"akash1owner","dseq":"42","gseq":1,"oseq":1}"#,
        );
        let parsed = MarketEvent::from_tx_event(&ev).unwrap();
        assert_eq!(
            parsed,
            MarketEvent::OrderCreated(OrderId {
                owner: OWNER.into(),
                dseq: 42,
                gseq: 1,
                oseq: 1
            })
        );
    }

    #[test]
    fn test_typed_lease_closed_needs_provider() {
        let with_provider = TxEvent::new("akash.market.v1beta5.EventLeaseClosed").with_attr(
            "id",
            r#"{"owner":"akash1owner","dseq":"42","gseq":2,"oseq":1,"provider":"akash1prov"}"#,
        );
        match MarketEvent::from_tx_event(&with_provider) {
            Some(MarketEvent::LeaseClosed(lease)) => {
                assert_eq!(lease.gseq, 2);
                assert_eq!(lease.provider, "akash1prov");
            }
            other => panic!("unexpected {:?}", other),
        }

        let without = TxEvent::new("akash.market.v1.EventLeaseCreated").with_attr(
            "id",
            r#"{"owner":"akash1owner","dseq":"42","gseq":2,"oseq":1}"#,
        );
        assert!(MarketEvent::from_tx_event(&without).is_none());
    }

    #[test]
    fn test_flat_quoted_attributes() {
        let ev = TxEvent::new("akash.market.v1.EventOrderClosed")
            .with_attr("owner", "\"akash1owner\"")
            .with_attr("dseq", "\"42\"")
            .with_attr("gseq", "3")
            .with_attr("oseq", "1");
        match MarketEvent::from_tx_event(&ev) {
            Some(MarketEvent::OrderClosed(order)) => {
                assert_eq!(order.owner, OWNER);
                assert_eq!(order.gseq, 3);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_legacy_action_form() {
        let ev = TxEvent::new("akash.v1")
            .with_attr("module", "market")
            .with_attr("action", "lease-created")
            .with_attr("owner", OWNER)
            .with_attr("dseq", "42")
            .with_attr("gseq", "1")
            .with_attr("oseq", "1")
            .with_attr("provider", "akash1prov");
        assert!(matches!(
            MarketEvent::from_tx_event(&ev),
            Some(MarketEvent::LeaseCreated(_))
        ));
    }

    #[test]
    fn test_ignores_unrelated_events() {
        let deployment = TxEvent::new("akash.deployment.v1.EventDeploymentCreated")
            .with_attr("id", r#"{"owner":"akash1owner","dseq":"42"}"#);
        assert!(MarketEvent::from_tx_event(&deployment).is_none());

        let transfer = TxEvent::new("transfer").with_attr("amount", "5uakt");
        assert!(MarketEvent::from_tx_event(&transfer).is_none());

        let bid = TxEvent::new("akash.market.v1.EventBidCreated")
            .with_attr("id", r#"{"owner":"akash1owner","dseq":"42","gseq":1,"oseq":1}"#);
        assert!(MarketEvent::from_tx_event(&bid).is_none());
    }

    #[test]
    fn test_malformed_id_is_skipped() {
        let ev = TxEvent::new("akash.market.v1.EventOrderCreated").with_attr("id", "not json");
        assert!(MarketEvent::from_tx_event(&ev).is_none());

        let missing_oseq = TxEvent::new("akash.market.v1.EventOrderCreated")
            .with_attr("id", r#"{"owner":"akash1owner","dseq":"42","gseq":1}"#);
        assert!(MarketEvent::from_tx_event(&missing_oseq).is_none());
    }

    #[test]
    fn test_collect_keeps_order() {
        let events = vec![
            TxEvent::new("message").with_attr("action", "/akash.deployment.v1beta4.MsgCreateDeployment"),
            TxEvent::new("akash.market.v1.EventOrderCreated")
                .with_attr("id", r#"{"owner":"akash1owner","dseq":"42","gseq":1,"oseq":1}"#),
            TxEvent::new("akash.market.v1.EventOrderCreated")
                .with_attr("id", r#"{"owner":"akash1owner","dseq":"42","gseq":2,"oseq":1}"#),
        ];
        let parsed = MarketEvent::collect(&events);
        assert_eq!(parsed.len(), 2);
        match &parsed[1] {
            MarketEvent::OrderCreated(o) => assert_eq!(o.gseq, 2),
            other => panic!("unexpected {:?}", other),
        }
    }
}
