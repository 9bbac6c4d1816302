//! Order engine configuration from the environment.
//!
//! `SHOPDESK_CONFIG_JSON` (a full [`OrderContext`] document) is read first;
//! the individual `SHOPDESK_*` variables then override single fields.

use anyhow::{Context, Result, bail};

use shopdesk_orders::OrderContext;
use shopdesk_tax::TaxCategoryId;

pub const CONFIG_JSON: &str = "SHOPDESK_CONFIG_JSON";
pub const ESTIMATE_PREFIX: &str = "SHOPDESK_ESTIMATE_PREFIX";
pub const INVOICE_PREFIX: &str = "SHOPDESK_INVOICE_PREFIX";
pub const STOCK_CHECK: &str = "SHOPDESK_STOCK_CHECK";
pub const ROUNDING_DP: &str = "SHOPDESK_ROUNDING_DP";
pub const ALLOW_NEGATIVE: &str = "SHOPDESK_ALLOW_NEGATIVE";
pub const DEFAULT_TAX_CATEGORY: &str = "SHOPDESK_DEFAULT_TAX_CATEGORY";

/// Load from process environment variables.
pub fn load_context() -> Result<OrderContext> {
    load_context_from(|name| std::env::var(name).ok())
}

/// Load using `lookup` to read variables.
pub fn load_context_from(lookup: impl Fn(&str) -> Option<String>) -> Result<OrderContext> {
    let mut context = match lookup(CONFIG_JSON) {
        Some(json) => serde_json::from_str(&json).with_context(|| format!("parsing {CONFIG_JSON}"))?,
        None => OrderContext::default(),
    };

    if let Some(prefix) = lookup(ESTIMATE_PREFIX) {
        context.prefixes.estimate = prefix;
    }
    if let Some(prefix) = lookup(INVOICE_PREFIX) {
        context.prefixes.invoice = prefix;
    }
    if let Some(value) = lookup(STOCK_CHECK) {
        context.stock_check = parse_bool(STOCK_CHECK, &value)?;
    }
    if let Some(value) = lookup(ALLOW_NEGATIVE) {
        context.allow_negative_value = parse_bool(ALLOW_NEGATIVE, &value)?;
    }
    if let Some(value) = lookup(ROUNDING_DP) {
        let dp: u32 = value
            .trim()
            .parse()
            .with_context(|| format!("parsing {ROUNDING_DP}={value}"))?;
        if dp > 10 {
            bail!("{ROUNDING_DP} must be at most 10, got {dp}");
        }
        context.rounding.internal_dp = dp;
    }
    if let Some(value) = lookup(DEFAULT_TAX_CATEGORY) {
        let id: i64 = value
            .trim()
            .parse()
            .with_context(|| format!("parsing {DEFAULT_TAX_CATEGORY}={value}"))?;
        context.default_tax_category = Some(TaxCategoryId(id));
    }

    tracing::debug!(?context, "order context loaded");
    Ok(context)
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("{name} must be a boolean, got '{other}'"),
    }
}
