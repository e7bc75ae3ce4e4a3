//! ISChain 电源序列
//!
//! 上电: 接口通道打开 → 核心电源轨 → 接口复位 → (主机门控表)
//! 下电: 接口通道关闭 → 核心电源轨 → (关闭主机门控), 每步失败记录后继续
//! 任一步失败都回退已完成的部分, 并返回原始失败步骤

use super::power::{teardown_result, teardown_step, PowerSequence, PowerStep, StepError};
use crate::config::DebugFlags;
use crate::hal::ClockGateTable;
use crate::kernel::resource::DeviceHandle;

/// ISP 链硬件操作 (由 ischain 驱动提供)
pub trait IsChainOps: Send + Sync {
    /// 打开主机到固件的接口通道
    fn interface_open(&self, device: DeviceHandle) -> Result<(), &'static str>;
    fn interface_close(&self, device: DeviceHandle) -> Result<(), &'static str>;

    fn core_power_on(&self, device: DeviceHandle) -> Result<(), &'static str>;
    fn core_power_off(&self, device: DeviceHandle) -> Result<(), &'static str>;

    /// 接口复位; 已知固件版本上电后必须执行
    fn interface_reset(&self, device: DeviceHandle) -> Result<(), &'static str>;

    /// 写入主机侧时钟门控表
    fn clock_gate_init(
        &self,
        device: DeviceHandle,
        table: &ClockGateTable,
    ) -> Result<(), &'static str>;

    /// 关闭主机侧时钟门控
    fn clock_gate_disable(&self, device: DeviceHandle) -> Result<(), &'static str>;
}

pub struct IsChainSequence<O: IsChainOps> {
    ops: O,
    debug: DebugFlags,
    gate_table: ClockGateTable,
}

impl<O: IsChainOps> IsChainSequence<O> {
    pub fn new(ops: O, debug: DebugFlags) -> Self {
        IsChainSequence {
            ops,
            debug,
            gate_table: ClockGateTable::default(),
        }
    }

    pub fn with_gate_table(mut self, table: ClockGateTable) -> Self {
        self.gate_table = table;
        self
    }

    pub fn ops(&self) -> &O {
        &self.ops
    }

    /// 回退: 关电源轨 (若已上电) 再关接口
    fn unwind(&self, device: DeviceHandle, core_powered: bool) {
        if core_powered {
            if let Err(reason) = self.ops.core_power_off(device) {
                log::error!("[PWR] ischain unwind core_power_off failed: {}", reason);
            }
        }
        if let Err(reason) = self.ops.interface_close(device) {
            log::error!("[PWR] ischain unwind interface_close failed: {}", reason);
        }
    }
}

impl<O: IsChainOps> PowerSequence for IsChainSequence<O> {
    fn power_on(&self, device: DeviceHandle) -> Result<(), StepError> {
        self.ops
            .interface_open(device)
            .map_err(|reason| StepError::new(PowerStep::InterfaceOpen, reason))?;

        if let Err(reason) = self.ops.core_power_on(device) {
            log::error!("[PWR] ischain core_power_on failed: {}", reason);
            self.unwind(device, false);
            return Err(StepError::new(PowerStep::CorePowerOn, reason));
        }

        if let Err(reason) = self.ops.interface_reset(device) {
            log::error!("[PWR] ischain interface_reset failed: {}", reason);
            self.unwind(device, true);
            return Err(StepError::new(PowerStep::InterfaceReset, reason));
        }

        if self.debug.host_clock_gating() {
            if let Err(reason) = self.ops.clock_gate_init(device, &self.gate_table) {
                log::error!("[PWR] ischain clock_gate_init failed: {}", reason);
                self.unwind(device, true);
                return Err(StepError::new(PowerStep::ClockGateInit, reason));
            }
        }

        Ok(())
    }

    fn power_off(&self, device: DeviceHandle) -> Result<(), StepError> {
        let mut first = None;
        teardown_step(&mut first, PowerStep::InterfaceClose, self.ops.interface_close(device));
        teardown_step(&mut first, PowerStep::CorePowerOff, self.ops.core_power_off(device));
        if self.debug.host_clock_gating() {
            teardown_step(
                &mut first,
                PowerStep::ClockGateOff,
                self.ops.clock_gate_disable(device),
            );
        }
        teardown_result(first)
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use alloc::vec::Vec;

    /// 记录调用顺序, 并把门控表写入一段模拟寄存器
    #[derive(Default)]
    pub struct RecordingIsChain {
        pub calls: spin::Mutex<Vec<&'static str>>,
        pub gate_regs: spin::Mutex<[u32; ClockGateTable::REG_WORDS]>,
        pub fail_on: Option<&'static str>,
    }

    impl RecordingIsChain {
        pub fn failing(step: &'static str) -> Self {
            RecordingIsChain {
                fail_on: Some(step),
                ..Default::default()
            }
        }

        fn record(&self, name: &'static str) -> Result<(), &'static str> {
            self.calls.lock().push(name);
            if self.fail_on == Some(name) {
                Err("injected failure")
            } else {
                Ok(())
            }
        }

        pub fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().clone()
        }
    }

    impl IsChainOps for RecordingIsChain {
        fn interface_open(&self, _d: DeviceHandle) -> Result<(), &'static str> {
            self.record("interface_open")
        }
        fn interface_close(&self, _d: DeviceHandle) -> Result<(), &'static str> {
            self.record("interface_close")
        }
        fn core_power_on(&self, _d: DeviceHandle) -> Result<(), &'static str> {
            self.record("core_power_on")
        }
        fn core_power_off(&self, _d: DeviceHandle) -> Result<(), &'static str> {
            self.record("core_power_off")
        }
        fn interface_reset(&self, _d: DeviceHandle) -> Result<(), &'static str> {
            self.record("interface_reset")
        }
        fn clock_gate_init(
            &self,
            _d: DeviceHandle,
            table: &ClockGateTable,
        ) -> Result<(), &'static str> {
            self.record("clock_gate_init")?;
            table.program(&mut *self.gate_regs.lock())
        }
        fn clock_gate_disable(&self, _d: DeviceHandle) -> Result<(), &'static str> {
            self.record("clock_gate_disable")?;
            ClockGateTable::disable(&mut *self.gate_regs.lock());
            Ok(())
        }
    }

    impl IsChainOps for alloc::sync::Arc<RecordingIsChain> {
        fn interface_open(&self, d: DeviceHandle) -> Result<(), &'static str> {
            (**self).interface_open(d)
        }
        fn interface_close(&self, d: DeviceHandle) -> Result<(), &'static str> {
            (**self).interface_close(d)
        }
        fn core_power_on(&self, d: DeviceHandle) -> Result<(), &'static str> {
            (**self).core_power_on(d)
        }
        fn core_power_off(&self, d: DeviceHandle) -> Result<(), &'static str> {
            (**self).core_power_off(d)
        }
        fn interface_reset(&self, d: DeviceHandle) -> Result<(), &'static str> {
            (**self).interface_reset(d)
        }
        fn clock_gate_init(
            &self,
            d: DeviceHandle,
            table: &ClockGateTable,
        ) -> Result<(), &'static str> {
            (**self).clock_gate_init(d, table)
        }
        fn clock_gate_disable(&self, d: DeviceHandle) -> Result<(), &'static str> {
            (**self).clock_gate_disable(d)
        }
    }
}
