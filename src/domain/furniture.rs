use serde::{Deserialize, Serialize};

/// One entry of the furniture catalog, as served by `GET /{style}/{type}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FurnitureOption {
    #[serde(rename = "type")]
    pub kind: String,
    pub style: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
}

impl FurnitureOption {
    pub fn new(
        kind: impl Into<String>,
        style: impl Into<String>,
        description: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            kind: kind.into(),
            style: style.into(),
            description: description.into(),
            price,
        }
    }

    /// Identity used to merge identical choices into one cart entry.
    ///
    /// Built from type, style and description. Two catalog entries that agree on
    /// all three are treated as the same item even if their prices differ.
    pub fn key(&self) -> String {
        format!("{}{}{}", self.kind, self.style, self.description)
    }

    /// Expands this option into the per-unit shape the orders endpoint expects.
    pub fn to_line_item(&self) -> OrderLineItem {
        OrderLineItem {
            price: self.price,
            kind: self.kind.clone(),
            style: self.style.clone(),
            description: self.description.clone(),
            furniture_type: self.style.clone(),
        }
    }
}

/// A single unit of furniture inside an order.
///
/// `furniture_type` mirrors the style; the backend's "by furniture type" query
/// matches on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    pub price: f64,
    #[serde(rename = "type")]
    pub kind: String,
    pub style: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub furniture_type: String,
}

impl OrderLineItem {
    pub fn has_style(&self, style: &str) -> bool {
        self.style == style || self.furniture_type == style
    }
}
