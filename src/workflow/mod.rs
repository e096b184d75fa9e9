pub mod messages;
pub mod snapshot;
pub mod stage_state;

pub use messages::{blocking_error, format_stage_error};
pub use snapshot::{SessionSnapshot, SessionState};
pub use stage_state::{StageSlot, StageStatus, StageView};
