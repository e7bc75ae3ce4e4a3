pub mod camera;
pub mod dvfs_ctrl;

pub use camera::{
    core, core_init, core_shutdown, CameraCore, Collaborators, CoreHooks, SharedMemory,
};
pub use dvfs_ctrl::DvfsController;
