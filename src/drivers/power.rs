//! 上电/下电序列接口
//!
//! 每种资源一个实现, 注册时选定; 资源管理器只在引用计数
//! 0→1 和 1→0 边沿调用

use core::fmt;

use crate::kernel::resource::DeviceHandle;

/// 上电/下电步骤
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerStep {
    /// 主时钟 (MCLK)
    MclkOn = 0,
    /// GPIO / 稳压器
    GpioOn = 1,
    /// 内部时钟
    IclkOn = 2,
    GpioOff = 3,
    IclkOff = 4,
    MclkOff = 5,
    /// 主机-固件接口通道
    InterfaceOpen = 6,
    InterfaceClose = 7,
    /// ISP 核心电源轨
    CorePowerOn = 8,
    CorePowerOff = 9,
    /// 上电后的接口复位
    InterfaceReset = 10,
    /// 主机侧时钟门控表
    ClockGateInit = 11,
    ClockGateOff = 12,
}

impl fmt::Display for PowerStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PowerStep::MclkOn => "mclk_on",
            PowerStep::GpioOn => "gpio_on",
            PowerStep::IclkOn => "iclk_on",
            PowerStep::GpioOff => "gpio_off",
            PowerStep::IclkOff => "iclk_off",
            PowerStep::MclkOff => "mclk_off",
            PowerStep::InterfaceOpen => "interface_open",
            PowerStep::InterfaceClose => "interface_close",
            PowerStep::CorePowerOn => "core_power_on",
            PowerStep::CorePowerOff => "core_power_off",
            PowerStep::InterfaceReset => "interface_reset",
            PowerStep::ClockGateInit => "clock_gate_init",
            PowerStep::ClockGateOff => "clock_gate_off",
        };
        write!(f, "{}", name)
    }
}

/// 某一步失败
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepError {
    pub step: PowerStep,
    pub reason: &'static str,
}

impl StepError {
    pub fn new(step: PowerStep, reason: &'static str) -> Self {
        StepError { step, reason }
    }
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.step, self.reason)
    }
}

/// 单个资源种类的电源序列
pub trait PowerSequence: Send + Sync {
    /// 上电; 失败时实现自行回滚已完成的步骤, 并返回首个失败步骤
    fn power_on(&self, device: DeviceHandle) -> Result<(), StepError>;

    /// 下电; 每一步失败都记录后继续, 返回首个失败步骤
    fn power_off(&self, device: DeviceHandle) -> Result<(), StepError>;
}

/// 全局一次性初始化/销毁 (DVFS 初始化, 共享内存等)
pub trait GlobalHooks: Send + Sync {
    fn global_init(&self) -> Result<(), &'static str>;

    fn global_teardown(&self);
}

/// 下电时的一步: 失败只记录, 并保留第一个错误
pub(crate) fn teardown_step(
    first: &mut Option<StepError>,
    step: PowerStep,
    result: Result<(), &'static str>,
) {
    if let Err(reason) = result {
        log::warn!("[PWR] {} failed: {}", step, reason);
        if first.is_none() {
            *first = Some(StepError::new(step, reason));
        }
    }
}

/// 汇总下电结果
pub(crate) fn teardown_result(first: Option<StepError>) -> Result<(), StepError> {
    match first {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
