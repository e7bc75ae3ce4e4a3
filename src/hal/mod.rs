pub mod clock_gate;

pub use clock_gate::{ClockGateTable, GateGroup, GroupGate};
