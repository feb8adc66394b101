use clap::Args;

use stocklog_core::{Inventory, Item};

#[derive(Args)]
pub struct ReportCommand {}

impl ReportCommand {
    pub fn run(&self, inventory: &Inventory) -> Result<(), Box<dyn std::error::Error>> {
        let items = inventory.items();
        let settings = inventory.settings();

        println!("Inventory report");
        println!("================\n");

        println!("Items:       {}", items.len());
        println!("Total units: {}", total_units(items));
        if settings.is_price_enabled {
            println!("Total value: {:.2}", total_value(items));
        }
        println!("Movements:   {}", inventory.movements().len());

        let low: Vec<&Item> = items.iter().filter(|item| item.is_low_stock()).collect();
        if !low.is_empty() {
            println!("\nLow stock:");
            for item in low {
                println!(
                    "  {:<24} {} of min {}",
                    item.name, item.quantity, item.min_stock
                );
            }
        }

        Ok(())
    }
}

fn total_units(items: &[Item]) -> u64 {
    items.iter().map(|item| u64::from(item.quantity)).sum()
}

fn total_value(items: &[Item]) -> f64 {
    items
        .iter()
        .map(|item| f64::from(item.quantity) * item.price)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals() {
        let items = vec![
            Item::new("A").with_quantity(3).with_price(2.0),
            Item::new("B").with_quantity(5).with_price(1.5),
        ];

        assert_eq!(total_units(&items), 8);
        assert_eq!(total_value(&items), 13.5);
    }

    #[test]
    fn test_totals_empty() {
        assert_eq!(total_units(&[]), 0);
        assert_eq!(total_value(&[]), 0.0);
    }
}
