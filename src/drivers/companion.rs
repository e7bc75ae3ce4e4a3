//! Companion 协处理器电源序列
//!
//! 与传感器同序; 核心只保证电源轨和时钟就绪,
//! 固件下载和就绪握手由上层完成

use core::time::Duration;

use super::power::{PowerSequence, StepError};
use super::sensor::{sensor_power_off, sensor_power_on, SensorOps};
use crate::error::Timeout;
use crate::kernel::resource::DeviceHandle;

/// Companion 硬件操作
pub trait CompanionOps: SensorOps {
    /// 等待固件就绪 (有界等待)
    fn await_ready(&self, device: DeviceHandle, timeout: Duration) -> Result<(), Timeout>;
}

pub struct CompanionSequence<O: CompanionOps> {
    ops: O,
}

impl<O: CompanionOps> CompanionSequence<O> {
    pub fn new(ops: O) -> Self {
        CompanionSequence { ops }
    }

    pub fn ops(&self) -> &O {
        &self.ops
    }

    /// 上层在推送固件后调用; 资源管理器从不调用
    pub fn await_ready(&self, device: DeviceHandle, timeout: Duration) -> Result<(), Timeout> {
        let ret = self.ops.await_ready(device, timeout);
        if ret.is_err() {
            log::error!("[PWR] companion firmware not ready in {:?}", timeout);
        }
        ret
    }
}

impl<O: CompanionOps> PowerSequence for CompanionSequence<O> {
    fn power_on(&self, device: DeviceHandle) -> Result<(), StepError> {
        log::debug!("[PWR] companion {:?} power on", device);
        sensor_power_on(&self.ops, device)
    }

    fn power_off(&self, device: DeviceHandle) -> Result<(), StepError> {
        log::debug!("[PWR] companion {:?} power off", device);
        sensor_power_off(&self.ops, device)
    }
}
