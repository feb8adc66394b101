use clap::{Args, Subcommand};

use stocklog_core::{Inventory, MovementType};

use super::parse_item_id;

#[derive(Args)]
pub struct StockCommand {
    #[command(subcommand)]
    pub command: StockSubcommand,
}

#[derive(Subcommand)]
pub enum StockSubcommand {
    /// Record incoming stock
    In {
        /// Item id
        id: String,

        /// Quantity to add
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        quantity: u32,
    },

    /// Record outgoing stock (fails when more than available)
    Out {
        /// Item id
        id: String,

        /// Quantity to remove
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        quantity: u32,
    },
}

impl StockCommand {
    pub async fn run(&self, inventory: &mut Inventory) -> Result<(), Box<dyn std::error::Error>> {
        let (id, quantity, kind) = match &self.command {
            StockSubcommand::In { id, quantity } => (id, *quantity, MovementType::Entry),
            StockSubcommand::Out { id, quantity } => (id, *quantity, MovementType::Exit),
        };

        let id = parse_item_id(id)?;
        let new_quantity = inventory.adjust_stock(id, quantity, kind).await?;

        let verb = match kind {
            MovementType::Entry => "Added",
            MovementType::Exit => "Removed",
        };
        println!("{} {}. New quantity: {}", verb, quantity, new_quantity);

        Ok(())
    }
}
