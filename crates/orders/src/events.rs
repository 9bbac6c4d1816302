use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopdesk_events::Event;

use crate::order::OrderId;
use crate::status::OrderStatus;

/// Emitted once per successful write that changed an invoice's status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusChanged {
    pub order_id: OrderId,
    pub full_ref: Option<String>,
    pub old_status: OrderStatus,
    pub new_status: OrderStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Emitted when an estimate becomes an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConverted {
    pub order_id: OrderId,
    pub full_ref: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    StatusChanged(OrderStatusChanged),
    ConvertedToInvoice(OrderConverted),
}

impl OrderEvent {
    pub fn order_id(&self) -> OrderId {
        match self {
            OrderEvent::StatusChanged(e) => e.order_id,
            OrderEvent::ConvertedToInvoice(e) => e.order_id,
        }
    }
}

impl Event for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::StatusChanged(_) => "orders.order.status_changed",
            OrderEvent::ConvertedToInvoice(_) => "orders.order.converted_to_invoice",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OrderEvent::StatusChanged(e) => e.occurred_at,
            OrderEvent::ConvertedToInvoice(e) => e.occurred_at,
        }
    }
}
