//! Use cases - User story orchestration.
//!
//! Each module covers one area of play. Use cases depend on port traits
//! only, so they are tested against mocks.

pub mod adventure;
pub mod dice;
pub mod management;
pub mod narration;
pub mod session;
pub mod toolkit;
pub mod trace;

pub use adventure::{AdventureOps, AdventureStatus};
pub use dice::{DiceOps, RollDiceInput};
pub use management::{ManagementError, ManagementUseCases};
pub use narration::{Narrate, NarrateInput, NarrationError, NarrationResult};
pub use session::{CreateSessionInput, SessionOps};
pub use toolkit::{NewToolkitRecord, ToolkitCrud, ToolkitUseCases};
pub use trace::{TraceError, TraceService};
