use serde::{Deserialize, Serialize};

/// Estimate (draft/quote) or Invoice (billable order).
///
/// The only transition is Estimate → Invoice, and it keeps the order's id and items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    Estimate,
    Invoice,
}

/// Invoice status lifecycle.
///
/// No transition table is enforced: any status may be marked from any other.
/// Which edits are allowed in which status is decided by [`StatusConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Incomplete,
    Pending,
    PartPaid,
    Paid,
    Processing,
    Ready,
    Dispatched,
    Collected,
    Cancelled,
    Refunded,
    Failed,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 11] = [
        OrderStatus::Incomplete,
        OrderStatus::Pending,
        OrderStatus::PartPaid,
        OrderStatus::Paid,
        OrderStatus::Processing,
        OrderStatus::Ready,
        OrderStatus::Dispatched,
        OrderStatus::Collected,
        OrderStatus::Cancelled,
        OrderStatus::Refunded,
        OrderStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Incomplete => "incomplete",
            OrderStatus::Pending => "pending",
            OrderStatus::PartPaid => "part-paid",
            OrderStatus::Paid => "paid",
            OrderStatus::Processing => "processing",
            OrderStatus::Ready => "ready",
            OrderStatus::Dispatched => "dispatched",
            OrderStatus::Collected => "collected",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
            OrderStatus::Failed => "failed",
        }
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for OrderStatus {
    type Err = shopdesk_core::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| shopdesk_core::DomainError::validation(format!("UnknownStatus: {wanted}")))
    }
}

/// Status groups. Configuration data, not per-type constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    /// Status given to new invoices and to converted estimates.
    pub default_status: OrderStatus,
    /// Statuses in which free-form edits (items, delivery, postage) are allowed.
    pub editable: Vec<OrderStatus>,
    /// Awaiting (full) payment.
    pub outstanding: Vec<OrderStatus>,
    pub paid: Vec<OrderStatus>,
    /// Finished with; shown in order history.
    pub historic: Vec<OrderStatus>,
}

impl Default for StatusConfig {
    fn default() -> Self {
        use OrderStatus::*;
        Self {
            default_status: Incomplete,
            editable: vec![Incomplete, Pending, PartPaid, Failed],
            outstanding: vec![Incomplete, Pending, PartPaid],
            paid: vec![Paid, Processing, Ready, Dispatched, Collected],
            historic: vec![Dispatched, Collected, Cancelled, Refunded],
        }
    }
}

impl StatusConfig {
    pub fn is_editable(&self, status: OrderStatus) -> bool {
        self.editable.contains(&status)
    }

    pub fn is_outstanding(&self, status: OrderStatus) -> bool {
        self.outstanding.contains(&status)
    }

    pub fn is_paid(&self, status: OrderStatus) -> bool {
        self.paid.contains(&status)
    }

    pub fn is_historic(&self, status: OrderStatus) -> bool {
        self.historic.contains(&status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_kebab_case() {
        let json = serde_json::to_string(&OrderStatus::PartPaid).unwrap();
        assert_eq!(json, "\"part-paid\"");
        let back: OrderStatus = serde_json::from_str("\"part-paid\"").unwrap();
        assert_eq!(back, OrderStatus::PartPaid);
    }

    #[test]
    fn parse_matches_display_for_every_status() {
        for status in OrderStatus::ALL {
            assert_eq!(status.to_string().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn default_groups() {
        let cfg = StatusConfig::default();
        assert_eq!(cfg.default_status, OrderStatus::Incomplete);
        assert!(cfg.is_editable(OrderStatus::Pending));
        assert!(!cfg.is_editable(OrderStatus::Paid));
        assert!(cfg.is_paid(OrderStatus::Dispatched));
        assert!(cfg.is_historic(OrderStatus::Refunded));
        assert!(cfg.is_outstanding(OrderStatus::PartPaid));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg: StatusConfig = serde_json::from_str(r#"{"editable":["incomplete"]}"#).unwrap();
        assert_eq!(cfg.editable, vec![OrderStatus::Incomplete]);
        assert_eq!(cfg.paid, StatusConfig::default().paid);
    }
}
