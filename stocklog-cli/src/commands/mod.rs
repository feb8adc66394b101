mod config_cmd;
mod history;
mod item;
mod report;
mod settings_cmd;
mod snapshot_cmd;
mod stock;

pub use config_cmd::ConfigCommand;
pub use history::HistoryCommand;
pub use item::ItemCommand;
pub use report::ReportCommand;
pub use settings_cmd::SettingsCommand;
pub use snapshot_cmd::{ExportCommand, ImportCommand};
pub use stock::StockCommand;

use std::io::{BufRead, Write};
use uuid::Uuid;

/// Parses an item id argument, with a friendlier message than uuid's own.
pub(crate) fn parse_item_id(raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw).map_err(|_| format!("'{}' is not a valid item id", raw))
}

/// Asks the user to confirm a destructive action. Anything other than
/// `y`/`yes` counts as a refusal.
pub(crate) fn confirm(prompt: &str) -> std::io::Result<bool> {
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;

    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}
