pub mod kind;
pub mod manager;
pub mod slot;

pub use kind::{DeviceHandle, PowerFlags, ResourceKind};
pub use manager::{GlobalState, ResourceManager, ResourceStatus, SlotStatus};
pub use slot::{ResourceSlot, SlotState};
