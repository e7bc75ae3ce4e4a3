//! 资源槽位
//!
//! 每种资源一个槽位, probe 时创建, 模块卸载前不销毁

use alloc::boxed::Box;
use core::fmt;

use super::kind::{DeviceHandle, ResourceKind};
use crate::drivers::power::PowerSequence;
use crate::error::ResourceError;

/// 槽位状态
///
/// `Opening`/`Closing` 只在资源管理器锁内出现, 外部观察者只会看到
/// `Closed` 或 `Open`
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Closed = 0,
    Opening = 1,
    Open = 2,
    Closing = 3,
}

impl fmt::Display for SlotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotState::Closed => write!(f, "closed"),
            SlotState::Opening => write!(f, "opening"),
            SlotState::Open => write!(f, "open"),
            SlotState::Closing => write!(f, "closing"),
        }
    }
}

/// 注册信息: 设备句柄与该种类的电源序列
pub(crate) struct Registration {
    pub device: DeviceHandle,
    pub sequence: Box<dyn PowerSequence>,
}

pub struct ResourceSlot {
    kind: ResourceKind,
    ref_count: u32,
    state: SlotState,
    registration: Option<Registration>,
}

impl ResourceSlot {
    pub(crate) fn new(kind: ResourceKind) -> Self {
        ResourceSlot {
            kind,
            ref_count: 0,
            state: SlotState::Closed,
            registration: None,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn ref_count(&self) -> u32 {
        self.ref_count
    }

    pub fn state(&self) -> SlotState {
        self.state
    }

    pub fn device(&self) -> Option<DeviceHandle> {
        self.registration.as_ref().map(|r| r.device)
    }

    pub(crate) fn register(&mut self, registration: Registration) -> Result<(), ResourceError> {
        if self.registration.is_some() {
            return Err(ResourceError::AlreadyRegistered(self.kind));
        }
        self.registration = Some(registration);
        Ok(())
    }

    pub(crate) fn registration(&self) -> Result<&Registration, ResourceError> {
        self.registration
            .as_ref()
            .ok_or(ResourceError::NotRegistered(self.kind))
    }

    // ============ 电源序列 ============

    pub(crate) fn power_on(&self) -> Result<(), ResourceError> {
        let reg = self.registration()?;
        reg.sequence.power_on(reg.device).map_err(|err| {
            log::error!("[RSC] {} power on failed ({})", self.kind, err);
            ResourceError::PowerSequenceFailed {
                kind: self.kind,
                step: err.step,
            }
        })
    }

    /// 下电失败只记录, 不影响调用者的计数处理
    pub(crate) fn power_off(&self) {
        match self.registration() {
            Ok(reg) => {
                if let Err(err) = reg.sequence.power_off(reg.device) {
                    log::error!("[RSC] {} power off failed ({})", self.kind, err);
                }
            }
            Err(err) => log::error!("[RSC] {}", err),
        }
    }

    // ============ 状态迁移 ============

    pub(crate) fn begin_open(&mut self) -> Result<(), ResourceError> {
        match self.state {
            SlotState::Closed if self.ref_count == 0 => {
                self.state = SlotState::Opening;
                Ok(())
            }
            _ => Err(ResourceError::InvariantViolation("open from non-closed slot")),
        }
    }

    pub(crate) fn finish_open(&mut self) {
        self.state = SlotState::Open;
    }

    pub(crate) fn abort_open(&mut self) {
        self.state = SlotState::Closed;
    }

    pub(crate) fn begin_close(&mut self) {
        self.state = SlotState::Closing;
    }

    pub(crate) fn finish_close(&mut self) {
        self.state = SlotState::Closed;
    }

    // ============ 引用计数 ============

    /// 计数加一, 返回之前的值
    pub(crate) fn acquire(&mut self) -> Result<u32, ResourceError> {
        let prev = self.ref_count;
        self.ref_count = prev
            .checked_add(1)
            .ok_or(ResourceError::TooManyHolders)?;
        Ok(prev)
    }

    /// 计数减一, 返回之后的值; 为 0 时返回 `Underflow` 且不修改
    pub(crate) fn release(&mut self) -> Result<u32, ResourceError> {
        self.ref_count = self
            .ref_count
            .checked_sub(1)
            .ok_or(ResourceError::Underflow)?;
        Ok(self.ref_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_never_below_zero() {
        let mut slot = ResourceSlot::new(ResourceKind::Sensor0);
        assert_eq!(slot.release(), Err(ResourceError::Underflow));
        assert_eq!(slot.ref_count(), 0);

        assert_eq!(slot.acquire(), Ok(0));
        assert_eq!(slot.acquire(), Ok(1));
        assert_eq!(slot.release(), Ok(1));
        assert_eq!(slot.release(), Ok(0));
        assert_eq!(slot.release(), Err(ResourceError::Underflow));
    }

    #[test]
    fn test_open_only_from_closed() {
        let mut slot = ResourceSlot::new(ResourceKind::IsChain);
        slot.begin_open().unwrap();
        assert_eq!(slot.state(), SlotState::Opening);
        assert!(slot.begin_open().is_err());
        slot.finish_open();
        assert_eq!(slot.state(), SlotState::Open);
        slot.begin_close();
        slot.finish_close();
        assert_eq!(slot.state(), SlotState::Closed);
    }

    #[test]
    fn test_unregistered_slot() {
        let slot = ResourceSlot::new(ResourceKind::Companion);
        assert!(matches!(
            slot.registration(),
            Err(ResourceError::NotRegistered(ResourceKind::Companion))
        ));
        assert_eq!(slot.device(), None);
    }

    #[test]
    fn test_acquire_at_limit_leaves_count() {
        let mut slot = ResourceSlot::new(ResourceKind::Sensor1);
        slot.ref_count = u32::MAX;
        assert_eq!(slot.acquire(), Err(ResourceError::TooManyHolders));
        assert_eq!(slot.ref_count(), u32::MAX);
    }
}
