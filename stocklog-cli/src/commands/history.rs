use clap::Args;
use std::collections::HashMap;
use uuid::Uuid;

use stocklog_core::{Inventory, Movement};

use super::parse_item_id;

/// Label shown for movements whose item was deleted.
const UNKNOWN_ITEM: &str = "unknown item";

#[derive(Args)]
pub struct HistoryCommand {
    /// Only show movements of one item
    #[arg(long)]
    pub item: Option<String>,

    /// Maximum number of movements to show
    #[arg(long, short, default_value_t = 50)]
    pub limit: usize,
}

impl HistoryCommand {
    pub fn run(&self, inventory: &Inventory) -> Result<(), Box<dyn std::error::Error>> {
        let filter = match &self.item {
            Some(raw) => Some(parse_item_id(raw)?),
            None => None,
        };

        let names: HashMap<Uuid, &str> = inventory
            .items()
            .iter()
            .map(|item| (item.id, item.name.as_str()))
            .collect();

        // Newest first for display; stored order is insertion order.
        let mut movements: Vec<&Movement> = inventory
            .movements()
            .iter()
            .filter(|movement| filter.map_or(true, |id| movement.item_id == id))
            .collect();
        movements.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        if movements.is_empty() {
            println!("No movements.");
            return Ok(());
        }

        for movement in movements.iter().take(self.limit) {
            println!("{}", format_movement_line(movement, &names));
        }

        Ok(())
    }
}

fn format_movement_line(movement: &Movement, names: &HashMap<Uuid, &str>) -> String {
    let name = names
        .get(&movement.item_id)
        .copied()
        .unwrap_or(UNKNOWN_ITEM);
    format!(
        "{}  {:<5} {:>5}  {}",
        movement.timestamp.format("%Y-%m-%d %H:%M"),
        movement.kind.to_string(),
        movement.quantity,
        name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use stocklog_core::MovementType;

    #[test]
    fn test_format_movement_line_with_known_item() {
        let id = Uuid::new_v4();
        let movement = Movement::new(id, MovementType::Entry, 5);
        let mut names = HashMap::new();
        names.insert(id, "Screws");

        let line = format_movement_line(&movement, &names);
        assert!(line.contains("entry"));
        assert!(line.contains("Screws"));
    }

    #[test]
    fn test_dangling_item_id_shows_unknown_item() {
        let movement = Movement::new(Uuid::new_v4(), MovementType::Exit, 2);
        let names = HashMap::new();

        let line = format_movement_line(&movement, &names);
        assert!(line.contains(UNKNOWN_ITEM));
    }
}
