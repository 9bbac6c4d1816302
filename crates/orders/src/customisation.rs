use serde::{Deserialize, Serialize};

use shopdesk_core::{DomainError, DomainResult, Entity, EntityId, typed_id};

use crate::line_item::LineItemId;

typed_id!(
    /// Customisation identifier.
    CustomisationId(EntityId)
);

/// A named variant attribute on a line item ("Colour: Red").
///
/// Customisations take part in the line item's key. They carry no price of
/// their own; price differences are expressed as price modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customisation {
    pub id: CustomisationId,
    pub line_item_id: LineItemId,
    pub title: String,
    pub value: String,
    /// Display order among the item's customisations.
    pub sort: i32,
    /// Kept for the key but not shown on documents.
    pub hidden: bool,
}

/// Extra fields a caller may set when customising. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
struct CustomisationExtra {
    #[serde(default)]
    sort: Option<i32>,
    #[serde(default)]
    hidden: Option<bool>,
}

impl Customisation {
    pub fn new(line_item_id: LineItemId, title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: CustomisationId::new(),
            line_item_id,
            title: title.into(),
            value: value.into(),
            sort: 0,
            hidden: false,
        }
    }

    /// Copy the allowed fields out of `extra` (a JSON object).
    pub fn apply_extra(&mut self, extra: &serde_json::Value) -> DomainResult<()> {
        if extra.is_null() {
            return Ok(());
        }
        let extra: CustomisationExtra = serde_json::from_value(extra.clone())
            .map_err(|e| DomainError::validation(format!("InvalidCustomisationData: {e}")))?;

        if let Some(sort) = extra.sort {
            self.sort = sort;
        }
        if let Some(hidden) = extra.hidden {
            self.hidden = hidden;
        }
        Ok(())
    }
}

impl Entity for Customisation {
    type Id = CustomisationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
