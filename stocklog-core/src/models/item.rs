use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// An inventory item.
///
/// The quantity reflects the current stock level and is only changed through
/// stock movements; it can never go negative. External JSON uses camelCase
/// field names to match the export/import document format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Path or data URL of the item photo, if one was captured.
    #[serde(default)]
    pub photo: Option<String>,
    pub quantity: u32,
    /// Stock level at or below which the item is flagged as low.
    pub min_stock: u32,
    /// Unit price; meaningful only when pricing is enabled in settings.
    pub price: f64,
    pub created_at: DateTime<Utc>,
}

impl Item {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            photo: None,
            quantity: 0,
            min_stock: 0,
            price: 0.0,
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_photo(mut self, photo: impl Into<String>) -> Self {
        self.photo = Some(photo.into());
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_min_stock(mut self, min_stock: u32) -> Self {
        self.min_stock = min_stock;
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    /// True when the current quantity is at or below the configured minimum.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_stock
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} in stock", self.name, self.quantity)?;
        if self.is_low_stock() {
            write!(f, ", LOW")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_new() {
        let item = Item::new("Screws");
        assert_eq!(item.name, "Screws");
        assert_eq!(item.quantity, 0);
        assert_eq!(item.min_stock, 0);
        assert!(item.photo.is_none());
    }

    #[test]
    fn test_item_builder() {
        let item = Item::new("Paint")
            .with_description("White matte, 1L")
            .with_quantity(12)
            .with_min_stock(3)
            .with_price(9.5);

        assert_eq!(item.description, "White matte, 1L");
        assert_eq!(item.quantity, 12);
        assert_eq!(item.min_stock, 3);
        assert_eq!(item.price, 9.5);
    }

    #[test]
    fn test_low_stock_boundary() {
        let item = Item::new("Tape").with_quantity(2).with_min_stock(2);
        assert!(item.is_low_stock());

        let item = Item::new("Tape").with_quantity(3).with_min_stock(2);
        assert!(!item.is_low_stock());
    }

    #[test]
    fn test_item_json_field_names() {
        let item = Item::new("Glue").with_min_stock(1);
        let json = serde_json::to_value(&item).unwrap();

        assert!(json.get("minStock").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("min_stock").is_none());
    }

    #[test]
    fn test_item_json_roundtrip() {
        let item = Item::new("Bolts")
            .with_quantity(40)
            .with_photo("photos/bolts.jpg")
            .with_price(0.15);

        let json = serde_json::to_string(&item).unwrap();
        let parsed: Item = serde_json::from_str(&json).unwrap();
        assert_eq!(item, parsed);
    }

    #[test]
    fn test_item_display_marks_low_stock() {
        let item = Item::new("Nails").with_quantity(1).with_min_stock(5);
        assert_eq!(format!("{}", item), "Nails (1 in stock, LOW)");
    }
}
