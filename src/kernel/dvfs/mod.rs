pub mod classifier;
pub mod perf_table;
pub mod qos;
pub mod scenario;
pub mod scenarios_default;

pub use classifier::{DvfsClassifier, DvfsScenarioCtrl};
pub use perf_table::{PerfTable, PerfTableEntry, PerformancePoint, QosAxis};
pub use qos::{I2cBusLock, I2cFreqGuard, QosApplier, QosSink};
pub use scenario::{
    DvfsScenario, RuntimeSnapshot, ScenarioId, ScenarioPredicate, SceneMode, SensorPosition,
};
