//! 传感器电源序列
//!
//! 上电: MCLK → GPIO → ICLK
//! 下电: GPIO → ICLK → MCLK, 每步失败记录后继续

use super::power::{teardown_result, teardown_step, PowerSequence, PowerStep, StepError};
use crate::kernel::resource::DeviceHandle;

/// 传感器侧硬件操作 (由传感器驱动提供)
pub trait SensorOps: Send + Sync {
    fn mclk_on(&self, device: DeviceHandle) -> Result<(), &'static str>;
    fn mclk_off(&self, device: DeviceHandle) -> Result<(), &'static str>;

    /// GPIO / 稳压器上电, 可能释放复位线
    fn gpio_on(&self, device: DeviceHandle) -> Result<(), &'static str>;
    fn gpio_off(&self, device: DeviceHandle) -> Result<(), &'static str>;

    fn iclk_on(&self, device: DeviceHandle) -> Result<(), &'static str>;
    fn iclk_off(&self, device: DeviceHandle) -> Result<(), &'static str>;
}

/// 回滚中的一步: 失败只记录, 继续回滚
fn unwind_step(step: PowerStep, result: Result<(), &'static str>) {
    if let Err(reason) = result {
        log::error!("[PWR] sensor unwind {} failed: {}", step, reason);
    }
}

/// 时钟 → GPIO → 内部时钟 的上电, 中途失败则回滚已完成步骤
pub(crate) fn sensor_power_on<O: SensorOps + ?Sized>(
    ops: &O,
    device: DeviceHandle,
) -> Result<(), StepError> {
    ops.mclk_on(device)
        .map_err(|reason| StepError::new(PowerStep::MclkOn, reason))?;

    if let Err(reason) = ops.gpio_on(device) {
        log::error!("[PWR] sensor gpio_on failed: {}", reason);
        unwind_step(PowerStep::MclkOff, ops.mclk_off(device));
        return Err(StepError::new(PowerStep::GpioOn, reason));
    }

    if let Err(reason) = ops.iclk_on(device) {
        log::error!("[PWR] sensor iclk_on failed: {}", reason);
        unwind_step(PowerStep::GpioOff, ops.gpio_off(device));
        unwind_step(PowerStep::MclkOff, ops.mclk_off(device));
        return Err(StepError::new(PowerStep::IclkOn, reason));
    }

    Ok(())
}

pub(crate) fn sensor_power_off<O: SensorOps + ?Sized>(
    ops: &O,
    device: DeviceHandle,
) -> Result<(), StepError> {
    let mut first = None;
    teardown_step(&mut first, PowerStep::GpioOff, ops.gpio_off(device));
    teardown_step(&mut first, PowerStep::IclkOff, ops.iclk_off(device));
    teardown_step(&mut first, PowerStep::MclkOff, ops.mclk_off(device));
    teardown_result(first)
}

/// 传感器资源的电源序列
pub struct SensorSequence<O: SensorOps> {
    ops: O,
}

impl<O: SensorOps> SensorSequence<O> {
    pub fn new(ops: O) -> Self {
        SensorSequence { ops }
    }

    pub fn ops(&self) -> &O {
        &self.ops
    }
}

impl<O: SensorOps> PowerSequence for SensorSequence<O> {
    fn power_on(&self, device: DeviceHandle) -> Result<(), StepError> {
        log::debug!("[PWR] sensor {:?} power on", device);
        sensor_power_on(&self.ops, device)
    }

    fn power_off(&self, device: DeviceHandle) -> Result<(), StepError> {
        log::debug!("[PWR] sensor {:?} power off", device);
        sensor_power_off(&self.ops, device)
    }
}


#[cfg(test)]
mod tests {
    use super::mock::RecordingSensor;
    use super::*;

    #[test]
    fn test_power_on_order() {
        let seq = SensorSequence::new(RecordingSensor::default());
        assert!(seq.power_on(DeviceHandle(0)).is_ok());
        assert_eq!(seq.ops().calls(), ["mclk_on", "gpio_on", "iclk_on"]);
    }

    #[test]
    fn test_power_off_order() {
        let seq = SensorSequence::new(RecordingSensor::default());
        assert!(seq.power_off(DeviceHandle(0)).is_ok());
        assert_eq!(seq.ops().calls(), ["gpio_off", "iclk_off", "mclk_off"]);
    }

    #[test]
    fn test_iclk_failure_unwinds() {
        let seq = SensorSequence::new(RecordingSensor::failing("iclk_on"));
        let err = seq.power_on(DeviceHandle(0)).unwrap_err();
        assert_eq!(err.step, PowerStep::IclkOn);
        assert_eq!(
            seq.ops().calls(),
            ["mclk_on", "gpio_on", "iclk_on", "gpio_off", "mclk_off"]
        );
    }

    #[test]
    fn test_power_off_continues_after_failure() {
        let seq = SensorSequence::new(RecordingSensor::failing("gpio_off"));
        let err = seq.power_off(DeviceHandle(0)).unwrap_err();
        assert_eq!(err.step, PowerStep::GpioOff);
        assert_eq!(seq.ops().calls(), ["gpio_off", "iclk_off", "mclk_off"]);
    }

    #[test]
    fn test_unwind_continues_past_failed_step() {
        let sensor = RecordingSensor {
            fail_on: alloc::vec!["iclk_on", "gpio_off"],
            ..Default::default()
        };
        let seq = SensorSequence::new(sensor);
        let err = seq.power_on(DeviceHandle(0)).unwrap_err();
        assert_eq!(err.step, PowerStep::IclkOn);
        assert_eq!(
            seq.ops().calls(),
            ["mclk_on", "gpio_on", "iclk_on", "gpio_off", "mclk_off"]
        );
    }
}
