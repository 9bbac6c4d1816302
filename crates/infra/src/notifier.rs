//! Status notifier that publishes order events onto an event bus.

use chrono::Utc;

use shopdesk_core::AggregateRoot;
use shopdesk_events::{EventBus, EventEnvelope};
use shopdesk_orders::{
    NotificationError, Order, OrderConverted, OrderEvent, OrderStatus, OrderStatusChanged,
    StatusNotifier,
};

pub const ORDER_AGGREGATE_TYPE: &str = "orders.order";

/// Publishes [`OrderEvent`]s after successful writes.
///
/// The envelope's `sequence_number` is the order version written, so consumers
/// can drop duplicate deliveries.
#[derive(Debug, Clone)]
pub struct BusNotifier<B> {
    bus: B,
}

impl<B> BusNotifier<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }
}

impl<B> BusNotifier<B>
where
    B: EventBus<EventEnvelope<OrderEvent>>,
{
    fn publish(&self, order: &Order, event: OrderEvent) -> Result<(), NotificationError> {
        let envelope =
            EventEnvelope::wrap(order.id_typed().0, ORDER_AGGREGATE_TYPE, order.version(), event);
        self.bus
            .publish(envelope)
            .map_err(|err| NotificationError::Delivery(format!("{err:?}")))
    }
}

impl<B> StatusNotifier for BusNotifier<B>
where
    B: EventBus<EventEnvelope<OrderEvent>>,
{
    fn on_status_changed(
        &self,
        order: &Order,
        old: OrderStatus,
        new: OrderStatus,
    ) -> Result<(), NotificationError> {
        self.publish(
            order,
            OrderEvent::StatusChanged(OrderStatusChanged {
                order_id: order.id_typed(),
                full_ref: order.full_ref(),
                old_status: old,
                new_status: new,
                occurred_at: Utc::now(),
            }),
        )
    }

    fn on_converted(&self, order: &Order) -> Result<(), NotificationError> {
        self.publish(
            order,
            OrderEvent::ConvertedToInvoice(OrderConverted {
                order_id: order.id_typed(),
                full_ref: order.full_ref(),
                occurred_at: Utc::now(),
            }),
        )
    }
}
