use chrono::Utc;
use clap::Args;
use std::fs;
use std::path::PathBuf;

use stocklog_core::{export_filename, Inventory, Snapshot};

use super::confirm;

#[derive(Args)]
pub struct ExportCommand {
    /// Name for the export file (becomes `<name>_<timestamp>.json`)
    pub name: String,

    /// Directory to write the export into
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,
}

impl ExportCommand {
    pub fn run(&self, inventory: &Inventory) -> Result<(), Box<dyn std::error::Error>> {
        let snapshot = inventory.export_snapshot();
        let path = self.dir.join(export_filename(&self.name, Utc::now()));

        fs::write(&path, snapshot.to_json_pretty()?)?;

        println!(
            "Exported {} item(s) and {} movement(s) to {}",
            snapshot.items.len(),
            snapshot.movements.len(),
            path.display()
        );
        Ok(())
    }
}

#[derive(Args)]
pub struct ImportCommand {
    /// Snapshot file to import
    pub file: PathBuf,

    /// Skip the confirmation prompt
    #[arg(long, short)]
    pub yes: bool,
}

impl ImportCommand {
    pub async fn run(&self, inventory: &mut Inventory) -> Result<(), Box<dyn std::error::Error>> {
        let text = fs::read_to_string(&self.file)?;

        // Validate before asking; a malformed file never touches state.
        let snapshot = Snapshot::from_json(&text)?;

        let prompt = format!(
            "Importing replaces ALL current data with {} item(s) and {} movement(s). Continue?",
            snapshot.items.len(),
            snapshot.movements.len()
        );
        if !self.yes && !confirm(&prompt)? {
            println!("Cancelled.");
            return Ok(());
        }

        inventory.import_snapshot(snapshot).await?;
        println!("Import complete.");
        Ok(())
    }
}
