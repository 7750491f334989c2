//! Rewards attached to slides and quest steps.

use serde::{Deserialize, Serialize};

use crate::id::ItemId;
use crate::payload::Payload;

/// An award applied to the player's profile.
///
/// Serialized as `{"item": {"id": ..., "payload": ...}}` or `{"currency": n}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grant {
    /// A unique inventory item. Granting an item already held is a no-op.
    Item(ItemGrant),
    /// Currency added to the wallet. Always additive.
    Currency(u64),
}

impl Grant {
    /// Grant an item with an empty payload.
    pub fn item(id: impl Into<ItemId>) -> Self {
        Self::Item(ItemGrant {
            id: id.into(),
            payload: Payload::new(),
        })
    }

    /// Grant an item carrying presentation data.
    pub fn item_with(id: impl Into<ItemId>, payload: Payload) -> Self {
        Self::Item(ItemGrant {
            id: id.into(),
            payload,
        })
    }

    /// Grant an amount of currency.
    pub fn currency(amount: u64) -> Self {
        Self::Currency(amount)
    }
}

/// The item half of a [`Grant`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemGrant {
    /// Item identifier.
    pub id: ItemId,
    /// Presentation data stored alongside the item.
    #[serde(default)]
    pub payload: Payload,
}

/// A crafting recipe: consume one of each prerequisite to produce one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Items consumed, one unit each.
    pub requires: Vec<ItemId>,
    /// The crafted item.
    pub produces: ItemId,
    /// Presentation data stored with the crafted item.
    #[serde(default)]
    pub payload: Payload,
}

impl Recipe {
    /// Create a recipe with an empty payload.
    pub fn new<I, T>(requires: I, produces: impl Into<ItemId>) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ItemId>,
    {
        Self {
            requires: requires.into_iter().map(Into::into).collect(),
            produces: produces.into(),
            payload: Payload::new(),
        }
    }

    /// Set the crafted item's payload.
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_json_shapes() {
        let item: Grant = serde_json::from_str(r#"{"item": {"id": "key"}}"#).unwrap();
        assert_eq!(item, Grant::item("key"));

        let coins: Grant = serde_json::from_str(r#"{"currency": 25}"#).unwrap();
        assert_eq!(coins, Grant::currency(25));
    }

    #[test]
    fn recipe_builder() {
        let recipe = Recipe::new(["ore", "coal", "flux"], "blade")
            .with_payload(Payload::text("A fine blade"));
        assert_eq!(recipe.requires.len(), 3);
        assert_eq!(recipe.produces, "blade");
        assert_eq!(recipe.payload.body(), Some("A fine blade"));
    }
}
