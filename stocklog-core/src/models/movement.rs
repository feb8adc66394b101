use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    /// Stock added to the inventory.
    Entry,
    /// Stock removed from the inventory.
    Exit,
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovementType::Entry => write!(f, "entry"),
            MovementType::Exit => write!(f, "exit"),
        }
    }
}

impl FromStr for MovementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "entry" | "in" => Ok(MovementType::Entry),
            "exit" | "out" => Ok(MovementType::Exit),
            _ => Err(format!(
                "Invalid movement type '{}'. Valid options: entry, exit",
                s
            )),
        }
    }
}

/// A recorded stock movement for one item.
///
/// Movements are immutable once created; they are only removed as a cascade
/// of deleting their item. `item_id` may dangle after such a cascade raced a
/// concurrent writer, in which case the item is displayed as unknown rather
/// than treated as an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    pub id: Uuid,
    pub item_id: Uuid,
    #[serde(rename = "type")]
    pub kind: MovementType,
    /// Magnitude of the change; always positive.
    pub quantity: u32,
    pub timestamp: DateTime<Utc>,
}

impl Movement {
    pub fn new(item_id: Uuid, kind: MovementType, quantity: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            item_id,
            kind,
            quantity,
            timestamp: Utc::now(),
        }
    }

    /// Backdates the movement, used for the synthetic entry recorded when an
    /// item is created with initial stock.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Signed effect of this movement on the item quantity.
    pub fn signed_delta(&self) -> i64 {
        match self.kind {
            MovementType::Entry => i64::from(self.quantity),
            MovementType::Exit => -i64::from(self.quantity),
        }
    }
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = match self.kind {
            MovementType::Entry => '+',
            MovementType::Exit => '-',
        };
        write!(
            f,
            "{} {}{}",
            self.timestamp.format("%Y-%m-%d %H:%M"),
            sign,
            self.quantity
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_type_display() {
        assert_eq!(format!("{}", MovementType::Entry), "entry");
        assert_eq!(format!("{}", MovementType::Exit), "exit");
    }

    #[test]
    fn test_movement_type_from_str() {
        assert_eq!(MovementType::from_str("entry").unwrap(), MovementType::Entry);
        assert_eq!(MovementType::from_str("EXIT").unwrap(), MovementType::Exit);
        assert_eq!(MovementType::from_str("in").unwrap(), MovementType::Entry);
        assert_eq!(MovementType::from_str("out").unwrap(), MovementType::Exit);
        assert!(MovementType::from_str("sideways").is_err());
    }

    #[test]
    fn test_signed_delta() {
        let item_id = Uuid::new_v4();
        assert_eq!(Movement::new(item_id, MovementType::Entry, 5).signed_delta(), 5);
        assert_eq!(Movement::new(item_id, MovementType::Exit, 3).signed_delta(), -3);
    }

    #[test]
    fn test_movement_json_field_names() {
        let movement = Movement::new(Uuid::new_v4(), MovementType::Entry, 2);
        let json = serde_json::to_value(&movement).unwrap();

        assert!(json.get("itemId").is_some());
        assert_eq!(json.get("type").unwrap(), "entry");
    }

    #[test]
    fn test_movement_json_roundtrip() {
        let movement = Movement::new(Uuid::new_v4(), MovementType::Exit, 7);
        let json = serde_json::to_string(&movement).unwrap();
        let parsed: Movement = serde_json::from_str(&json).unwrap();
        assert_eq!(movement, parsed);
    }
}
