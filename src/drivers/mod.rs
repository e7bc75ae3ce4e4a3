pub mod companion;
pub mod ischain;
pub mod power;
pub mod sensor;

pub use companion::{CompanionOps, CompanionSequence};
pub use ischain::{IsChainOps, IsChainSequence};
pub use power::{GlobalHooks, PowerSequence, PowerStep, StepError};
pub use sensor::{SensorOps, SensorSequence};
