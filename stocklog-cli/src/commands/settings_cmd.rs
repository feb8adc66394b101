use clap::{Args, Subcommand};
use std::str::FromStr;

use stocklog_core::{Inventory, Theme};

#[derive(Args)]
pub struct SettingsCommand {
    #[command(subcommand)]
    pub command: SettingsSubcommand,
}

#[derive(Subcommand)]
pub enum SettingsSubcommand {
    /// Show current settings
    Show,

    /// Change settings
    Set {
        /// Theme: light, dark or system
        #[arg(long)]
        theme: Option<String>,

        /// Prefill for the minimum-stock field of new items
        #[arg(long)]
        default_min_stock: Option<u32>,

        /// Enable or disable pricing (true/false)
        #[arg(long)]
        price_enabled: Option<bool>,
    },
}

impl SettingsCommand {
    pub async fn run(&self, inventory: &mut Inventory) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            SettingsSubcommand::Show => {
                let settings = inventory.settings();
                println!("theme:             {}", settings.theme);
                println!("default_min_stock: {}", settings.default_min_stock);
                println!("price_enabled:     {}", settings.is_price_enabled);
                Ok(())
            }

            SettingsSubcommand::Set {
                theme,
                default_min_stock,
                price_enabled,
            } => {
                let mut settings = inventory.settings().clone();

                if let Some(theme) = theme {
                    settings.theme = Theme::from_str(theme)?;
                }
                if let Some(default_min_stock) = default_min_stock {
                    settings.default_min_stock = *default_min_stock;
                }
                if let Some(price_enabled) = price_enabled {
                    settings.is_price_enabled = *price_enabled;
                }

                inventory.update_settings(settings).await?;
                println!("Settings saved.");
                Ok(())
            }
        }
    }
}
