//! 运行时配置
//!
//! 对应原驱动的 sysfs_debug 全局开关和 probe 时的资源参数,
//! 这里改为显式传入的配置结构

/// 时钟门控模式
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockGateMode {
    /// 由主机侧填写门控表
    Host = 0,
    /// 由固件自行管理
    Firmware = 1,
}

/// 调试开关
#[derive(Debug, Clone, Copy)]
pub struct DebugFlags {
    /// 是否启用 DVFS (关闭时 apply 不做任何事)
    pub en_dvfs: bool,
    /// 是否启用时钟门控
    pub en_clk_gate: bool,
    /// 时钟门控模式
    pub clk_gate_mode: ClockGateMode,
}

impl Default for DebugFlags {
    fn default() -> Self {
        DebugFlags {
            en_dvfs: true,
            en_clk_gate: false,
            clk_gate_mode: ClockGateMode::Host,
        }
    }
}

impl DebugFlags {
    /// ISChain 上电时是否需要初始化主机侧门控表
    pub fn host_clock_gating(&self) -> bool {
        self.en_clk_gate && self.clk_gate_mode == ClockGateMode::Host
    }
}

/// 资源管理器配置
#[derive(Debug, Clone, Copy)]
pub struct ResourceConfig {
    /// 同时持有的资源总数上限
    pub max_holders: u32,
    pub debug: DebugFlags,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        ResourceConfig {
            max_holders: 5,
            debug: DebugFlags::default(),
        }
    }
}

/// DVFS 配置
#[derive(Debug, Clone, Copy)]
pub struct DvfsConfig {
    /// 使用的性能表索引
    pub table_index: usize,
    /// 动态场景默认保持帧数
    pub keep_frame_tick: i32,
}

impl Default for DvfsConfig {
    fn default() -> Self {
        DvfsConfig {
            table_index: 0,
            keep_frame_tick: 5,
        }
    }
}
