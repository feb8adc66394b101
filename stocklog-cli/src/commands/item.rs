use clap::{Args, Subcommand};

use stocklog_core::{Inventory, Item};

use super::{confirm, parse_item_id};

#[derive(Args)]
pub struct ItemCommand {
    #[command(subcommand)]
    pub command: ItemSubcommand,
}

#[derive(Subcommand)]
pub enum ItemSubcommand {
    /// Add a new item to the inventory
    Add {
        /// Item name
        name: String,

        /// Item description
        #[arg(long, short, default_value = "")]
        description: String,

        /// Initial stock quantity (records an entry movement when positive)
        #[arg(long, short, default_value_t = 0)]
        quantity: u32,

        /// Low-stock threshold (defaults to the configured default)
        #[arg(long)]
        min_stock: Option<u32>,

        /// Unit price (shown only while pricing is enabled)
        #[arg(long)]
        price: Option<f64>,

        /// Path or URL of an item photo
        #[arg(long)]
        photo: Option<String>,
    },

    /// List items
    List {
        /// Only show items at or below their low-stock threshold
        #[arg(long)]
        low: bool,
    },

    /// Show one item in detail, including its recent movements
    Show {
        /// Item id
        id: String,
    },

    /// Edit an item's fields (stock quantity changes go through `stock`)
    Edit {
        /// Item id
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, short)]
        description: Option<String>,

        #[arg(long)]
        min_stock: Option<u32>,

        #[arg(long)]
        price: Option<f64>,

        #[arg(long)]
        photo: Option<String>,
    },

    /// Delete an item and its movement history
    Delete {
        /// Item id
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

impl ItemCommand {
    pub async fn run(&self, inventory: &mut Inventory) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ItemSubcommand::Add {
                name,
                description,
                quantity,
                min_stock,
                price,
                photo,
            } => {
                let min_stock = min_stock.unwrap_or(inventory.settings().default_min_stock);

                let mut item = Item::new(name)
                    .with_description(description.clone())
                    .with_quantity(*quantity)
                    .with_min_stock(min_stock)
                    .with_price(price.unwrap_or(0.0));
                if let Some(photo) = photo {
                    item = item.with_photo(photo.clone());
                }

                let id = item.id;
                inventory.save_item(item).await?;
                println!("Created item {}", id);
                Ok(())
            }

            ItemSubcommand::List { low } => {
                let show_price = inventory.settings().is_price_enabled;
                let mut shown = 0;

                for item in inventory.items() {
                    if *low && !item.is_low_stock() {
                        continue;
                    }
                    shown += 1;

                    let marker = if item.is_low_stock() { "  LOW" } else { "" };
                    if show_price {
                        println!(
                            "{}  {:<24} qty {:>5}  min {:>3}  @ {:.2}{}",
                            item.id, item.name, item.quantity, item.min_stock, item.price, marker
                        );
                    } else {
                        println!(
                            "{}  {:<24} qty {:>5}  min {:>3}{}",
                            item.id, item.name, item.quantity, item.min_stock, marker
                        );
                    }
                }

                if shown == 0 {
                    println!("No items.");
                }
                Ok(())
            }

            ItemSubcommand::Show { id } => {
                let id = parse_item_id(id)?;
                let item = inventory
                    .find_item(id)
                    .ok_or_else(|| format!("no item with id {}", id))?;

                println!("{}", item.name);
                println!("{}", "=".repeat(item.name.len()));
                if !item.description.is_empty() {
                    println!("{}", item.description);
                }
                println!("Quantity:  {}", item.quantity);
                println!("Min stock: {}", item.min_stock);
                if inventory.settings().is_price_enabled {
                    println!("Price:     {:.2}", item.price);
                }
                if let Some(photo) = &item.photo {
                    println!("Photo:     {}", photo);
                }
                println!("Created:   {}", item.created_at.format("%Y-%m-%d %H:%M"));
                if item.is_low_stock() {
                    println!("\nLow stock!");
                }

                let mut movements: Vec<_> = inventory
                    .movements()
                    .iter()
                    .filter(|movement| movement.item_id == id)
                    .collect();
                movements.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

                if !movements.is_empty() {
                    println!("\nRecent movements:");
                    for movement in movements.iter().take(5) {
                        println!("  {}", movement);
                    }
                }
                Ok(())
            }

            ItemSubcommand::Edit {
                id,
                name,
                description,
                min_stock,
                price,
                photo,
            } => {
                let id = parse_item_id(id)?;
                let mut item = inventory
                    .find_item(id)
                    .ok_or_else(|| format!("no item with id {}", id))?
                    .clone();

                if let Some(name) = name {
                    item.name = name.clone();
                }
                if let Some(description) = description {
                    item.description = description.clone();
                }
                if let Some(min_stock) = min_stock {
                    item.min_stock = *min_stock;
                }
                if let Some(price) = price {
                    item.price = *price;
                }
                if let Some(photo) = photo {
                    item.photo = Some(photo.clone());
                }

                inventory.save_item(item).await?;
                println!("Updated item {}", id);
                Ok(())
            }

            ItemSubcommand::Delete { id, yes } => {
                let id = parse_item_id(id)?;
                let item = inventory
                    .find_item(id)
                    .ok_or_else(|| format!("no item with id {}", id))?;

                let prompt = format!("Delete '{}' and its movement history?", item.name);
                if !*yes && !confirm(&prompt)? {
                    println!("Cancelled.");
                    return Ok(());
                }

                let removed = inventory.delete_item(id).await?;
                println!("Deleted '{}'.", removed.name);
                Ok(())
            }
        }
    }
}
