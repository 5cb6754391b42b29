//! Domain entities - Core records with identity

mod campaign;
mod character;
mod dice_roll;
mod session;
mod toolkit;

pub use campaign::Campaign;
pub use character::{Character, HitPoints, MAX_LEVEL};
pub use dice_roll::DiceRoll;
pub use session::Session;
pub use toolkit::{
    Encounter, InventoryItem, Location, Monster, Npc, Quest, QuestStatus, Reward, ToolkitEntry,
    ToolkitKind, ToolkitRecord,
};
