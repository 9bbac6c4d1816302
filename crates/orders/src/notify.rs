//! Status notifications (customer emails, dispatch slips, ...).
//!
//! Called after the write has succeeded. A failed notification is logged by the
//! caller and never undoes the write.

use thiserror::Error;

use crate::order::Order;
use crate::status::OrderStatus;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotificationError {
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

pub trait StatusNotifier: Send + Sync {
    fn on_status_changed(
        &self,
        order: &Order,
        old: OrderStatus,
        new: OrderStatus,
    ) -> Result<(), NotificationError>;

    fn on_converted(&self, _order: &Order) -> Result<(), NotificationError> {
        Ok(())
    }
}

/// Notifier that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl StatusNotifier for NoopNotifier {
    fn on_status_changed(&self, _: &Order, _: OrderStatus, _: OrderStatus) -> Result<(), NotificationError> {
        Ok(())
    }
}
