pub mod dvfs;
pub mod resource;

pub use dvfs::{DvfsClassifier, QosApplier, ScenarioId};
pub use resource::{ResourceKind, ResourceManager};
