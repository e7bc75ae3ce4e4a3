//! 错误类型
//!
//! - `ResourceError`: 资源 get/put 路径
//! - `ApplyError`: DVFS/QoS 应用路径
//! - `Timeout`: companion 固件握手 (协作层)
//! - `CoreError`: 全局实例生命周期

use core::fmt;

use crate::drivers::power::PowerStep;
use crate::kernel::dvfs::QosAxis;
use crate::kernel::resource::ResourceKind;

/// 资源管理错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceError {
    /// 同时持有者超过上限 (通常是泄漏的 get)
    TooManyHolders,
    /// put 了一个从未 get 的资源
    Underflow,
    /// 某个上电步骤失败
    PowerSequenceFailed { kind: ResourceKind, step: PowerStep },
    /// 槽位未注册
    NotRegistered(ResourceKind),
    /// 槽位重复注册
    AlreadyRegistered(ResourceKind),
    /// 全局一次性初始化失败
    GlobalInitFailed(&'static str),
    /// 内部状态不一致 (例如上电标志残留)
    InvariantViolation(&'static str),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::TooManyHolders => write!(f, "Too many resource holders"),
            ResourceError::Underflow => write!(f, "Resource refcount underflow"),
            ResourceError::PowerSequenceFailed { kind, step } => {
                write!(f, "Power sequence failed: {} at {}", kind, step)
            }
            ResourceError::NotRegistered(kind) => write!(f, "{} is not registered", kind),
            ResourceError::AlreadyRegistered(kind) => write!(f, "{} is already registered", kind),
            ResourceError::GlobalInitFailed(reason) => write!(f, "Global init failed: {}", reason),
            ResourceError::InvariantViolation(what) => write!(f, "Invariant violation: {}", what),
        }
    }
}

/// QoS 应用错误 (非致命, 其它轴仍会尝试)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyError {
    /// 第一个失败的轴, 以及失败轴总数
    AxisFailed { axis: QosAxis, failures: usize },
    /// 性能表索引越界
    InvalidTable(usize),
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplyError::AxisFailed { axis, failures } => {
                write!(f, "QoS apply failed on {} ({} axes failed)", axis, failures)
            }
            ApplyError::InvalidTable(idx) => write!(f, "Invalid DVFS table index {}", idx),
        }
    }
}

/// 协作层握手超时
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeout;

impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timed out waiting for firmware")
    }
}

/// 全局实例生命周期错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    AlreadyInitialized,
    NotInitialized,
    /// 仍有资源未释放, 附带总计数
    Busy(u32),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::AlreadyInitialized => write!(f, "Camera core already initialized"),
            CoreError::NotInitialized => write!(f, "Camera core not initialized"),
            CoreError::Busy(count) => write!(f, "Camera core busy ({} resources held)", count),
        }
    }
}
