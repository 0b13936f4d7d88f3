//! Connection supervision
//!
//! The supervisor accepts connections, hands each one to its own worker task,
//! tracks workers in a bounded slot table, and tears everything down when the
//! server state flips to `Stopped`.

pub mod console;
pub mod listener;
pub mod slots;
pub mod state;

pub use listener::{ShutdownReport, Supervisor};
pub use slots::{ConnectionSlot, SlotStatus, SlotTable};
pub use state::{ServerControl, ServerState};
