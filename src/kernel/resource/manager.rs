//! 资源管理器
//!
//! 对 sensor0/sensor1/ischain/companion 四个资源域做引用计数式的
//! get/put. 电源序列只在槽位计数 0→1 和 1→0 时执行, 全局初始化/销毁
//! 只在总计数 0→1 和 1→0 时执行. 整个 get/put 路径由一把锁串行化,
//! 包括其中的硬件操作.

use alloc::boxed::Box;
use core::fmt;

use super::kind::{DeviceHandle, PowerFlags, ResourceKind};
use super::slot::{Registration, ResourceSlot, SlotState};
use crate::config::ResourceConfig;
use crate::drivers::power::{GlobalHooks, PowerSequence};
use crate::error::ResourceError;

/// 全局计数与上电标志
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalState {
    /// 所有槽位计数之和, 与槽位同步增减
    pub total_ref_count: u32,
    pub power_on_flags: PowerFlags,
}

impl GlobalState {
    const fn new() -> Self {
        GlobalState {
            total_ref_count: 0,
            power_on_flags: PowerFlags::empty(),
        }
    }
}

struct ManagerInner {
    slots: [ResourceSlot; ResourceKind::COUNT],
    global: GlobalState,
}

pub struct ResourceManager {
    config: ResourceConfig,
    hooks: Box<dyn GlobalHooks>,
    inner: spin::Mutex<ManagerInner>,
}

impl ResourceManager {
    /// 创建资源管理器, 所有槽位为空
    pub fn new(config: ResourceConfig, hooks: Box<dyn GlobalHooks>) -> Self {
        ResourceManager {
            config,
            hooks,
            inner: spin::Mutex::new(ManagerInner {
                slots: [
                    ResourceSlot::new(ResourceKind::Sensor0),
                    ResourceSlot::new(ResourceKind::Sensor1),
                    ResourceSlot::new(ResourceKind::IsChain),
                    ResourceSlot::new(ResourceKind::Companion),
                ],
                global: GlobalState::new(),
            }),
        }
    }

    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    /// 注册槽位的设备和电源序列 (probe 时调用一次)
    pub fn register(
        &self,
        kind: ResourceKind,
        device: DeviceHandle,
        sequence: Box<dyn PowerSequence>,
    ) -> Result<(), ResourceError> {
        let mut inner = self.inner.lock();
        inner.slots[kind.index()].register(Registration { device, sequence })?;
        log::info!("[RSC] {} registered ({:?})", kind, device);
        Ok(())
    }

    /// 获取资源
    ///
    /// 失败时不留下任何状态: 本次调用做过的全局初始化会被撤销
    pub fn get(&self, kind: ResourceKind) -> Result<(), ResourceError> {
        let mut inner = self.inner.lock();
        let ManagerInner { slots, global } = &mut *inner;
        let slot = &mut slots[kind.index()];

        slot.registration()?;

        if global.total_ref_count >= self.config.max_holders {
            log::error!(
                "[RSC] {} get refused, {} holders already",
                kind,
                global.total_ref_count
            );
            return Err(ResourceError::TooManyHolders);
        }

        let mut global_opened = false;
        if global.total_ref_count == 0 {
            if global.power_on_flags.contains(PowerFlags::GLOBAL) {
                return Err(ResourceError::InvariantViolation("global init already done"));
            }
            self.hooks.global_init().map_err(|reason| {
                log::error!("[RSC] global init failed: {}", reason);
                ResourceError::GlobalInitFailed(reason)
            })?;
            global.power_on_flags.insert(PowerFlags::GLOBAL);
            global_opened = true;
            log::info!("[RSC] global init done");
        }

        let mut powered_here = false;
        if slot.ref_count() == 0 {
            let ret = if global.power_on_flags.contains(kind.power_flag()) {
                Err(ResourceError::InvariantViolation("power flag left set"))
            } else {
                slot.begin_open().and_then(|_| slot.power_on())
            };

            if let Err(err) = ret {
                if slot.state() == SlotState::Opening {
                    slot.abort_open();
                }
                if global_opened {
                    self.teardown_global(global);
                }
                return Err(err);
            }

            slot.finish_open();
            global.power_on_flags.insert(kind.power_flag());
            powered_here = true;
            log::info!("[RSC] {} power on", kind);
        }

        if let Err(err) = slot.acquire() {
            if powered_here {
                Self::close_slot(slot, global);
            }
            if global_opened {
                self.teardown_global(global);
            }
            return Err(err);
        }
        global.total_ref_count += 1;

        log::debug!(
            "[RSC] {} get: rsccount {}, total {}",
            kind,
            slot.ref_count(),
            global.total_ref_count
        );
        Ok(())
    }

    /// 释放资源
    ///
    /// 下电步骤的失败只记录, 计数总会完成递减
    pub fn put(&self, kind: ResourceKind) -> Result<(), ResourceError> {
        let mut inner = self.inner.lock();
        let ManagerInner { slots, global } = &mut *inner;
        let slot = &mut slots[kind.index()];

        slot.registration()?;

        if slot.ref_count() == 0 || global.total_ref_count == 0 {
            log::error!(
                "[RSC] {} put underflow: rsccount {}, total {}",
                kind,
                slot.ref_count(),
                global.total_ref_count
            );
            return Err(ResourceError::Underflow);
        }

        let remaining = slot.release()?;
        global.total_ref_count -= 1;

        if remaining == 0 {
            Self::close_slot(slot, global);
        }

        if global.total_ref_count == 0 {
            self.teardown_global(global);
        }

        log::debug!(
            "[RSC] {} put: rsccount {}, total {}",
            kind,
            remaining,
            global.total_ref_count
        );
        Ok(())
    }

    /// 下电并回到 `Closed`; 下电失败只记录
    fn close_slot(slot: &mut ResourceSlot, global: &mut GlobalState) {
        let kind = slot.kind();
        slot.begin_close();
        slot.power_off();
        slot.finish_close();
        global.power_on_flags.remove(kind.power_flag());
        log::info!("[RSC] {} power off", kind);
    }

    fn teardown_global(&self, global: &mut GlobalState) {
        self.hooks.global_teardown();
        global.power_on_flags.remove(PowerFlags::GLOBAL);
        log::info!("[RSC] global teardown done");
    }

    pub fn ref_count(&self, kind: ResourceKind) -> u32 {
        self.inner.lock().slots[kind.index()].ref_count()
    }

    pub fn total_ref_count(&self) -> u32 {
        self.inner.lock().global.total_ref_count
    }

    /// 资源表快照 (调试用)
    pub fn status(&self) -> ResourceStatus {
        let inner = self.inner.lock();
        let mut slots = [SlotStatus::EMPTY; ResourceKind::COUNT];
        for (status, slot) in slots.iter_mut().zip(inner.slots.iter()) {
            *status = SlotStatus {
                kind: slot.kind(),
                ref_count: slot.ref_count(),
                state: slot.state(),
                device: slot.device(),
            };
        }
        ResourceStatus {
            slots,
            global: inner.global,
        }
    }
}

/// 单个槽位的快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotStatus {
    pub kind: ResourceKind,
    pub ref_count: u32,
    pub state: SlotState,
    pub device: Option<DeviceHandle>,
}

impl SlotStatus {
    const EMPTY: SlotStatus = SlotStatus {
        kind: ResourceKind::Sensor0,
        ref_count: 0,
        state: SlotState::Closed,
        device: None,
    };
}

/// 资源表快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceStatus {
    pub slots: [SlotStatus; ResourceKind::COUNT],
    pub global: GlobalState,
}

impl ResourceStatus {
    /// 槽位计数之和
    pub fn slot_sum(&self) -> u32 {
        self.slots.iter().map(|s| s.ref_count).sum()
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rsccount {} flags {:#x}",
            self.global.total_ref_count,
            self.global.power_on_flags.bits()
        )?;
        for slot in self.slots.iter() {
            write!(f, ", {}: {} ({})", slot.kind, slot.ref_count, slot.state)?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    /// 统计上下电次数; 重复上电记为违例
    #[derive(Default)]
    pub struct CountingSequence {
        pub on: AtomicU32,
        pub off: AtomicU32,
        pub powered: AtomicBool,
        pub violations: AtomicU32,
        pub fail_on: bool,
        pub fail_off: bool,
    }

    impl PowerSequence for alloc::sync::Arc<CountingSequence> {
        fn power_on(&self, _d: DeviceHandle) -> Result<(), crate::drivers::StepError> {
            if self.fail_on {
                return Err(crate::drivers::StepError::new(
                    crate::drivers::PowerStep::MclkOn,
                    "injected failure",
                ));
            }
            if self.powered.swap(true, Ordering::SeqCst) {
                self.violations.fetch_add(1, Ordering::SeqCst);
            }
            self.on.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn power_off(&self, _d: DeviceHandle) -> Result<(), crate::drivers::StepError> {
            if !self.powered.swap(false, Ordering::SeqCst) {
                self.violations.fetch_add(1, Ordering::SeqCst);
            }
            self.off.fetch_add(1, Ordering::SeqCst);
            if self.fail_off {
                return Err(crate::drivers::StepError::new(
                    crate::drivers::PowerStep::GpioOff,
                    "injected failure",
                ));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct CountingHooks {
        pub init: AtomicU32,
        pub teardown: AtomicU32,
        pub fail_init: bool,
    }

    impl GlobalHooks for alloc::sync::Arc<CountingHooks> {
        fn global_init(&self) -> Result<(), &'static str> {
            if self.fail_init {
                return Err("no shared memory");
            }
            self.init.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn global_teardown(&self) {
            self.teardown.fetch_add(1, Ordering::SeqCst);
        }
    }
}
