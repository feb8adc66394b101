mod item;
mod movement;
mod settings;

pub use item::Item;
pub use movement::{Movement, MovementType};
pub use settings::{AppSettings, Theme};
