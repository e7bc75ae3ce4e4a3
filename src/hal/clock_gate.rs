//! ISP 时钟门控表 (主机模式)
//!
//! 每个处理组一对 on/off 掩码, ISChain 上电后写入共享寄存器区,
//! 固件按表开关各 IP 的时钟

use core::fmt;
use volatile::Volatile;

// ============ 处理组 IP 位 ============

pub const GATE_IP_3AA: u32 = 1 << 0;
pub const GATE_IP_ISP: u32 = 1 << 1;
pub const GATE_IP_DRC: u32 = 1 << 2;
pub const GATE_IP_DIS: u32 = 1 << 3;
pub const GATE_IP_3DNR: u32 = 1 << 4;
pub const GATE_IP_SCC: u32 = 1 << 5;
pub const GATE_IP_SCP: u32 = 1 << 6;
pub const GATE_IP_FD: u32 = 1 << 7;

/// 门控寄存器区: 使能字 + 每组 (on, off)
const GATE_REG_ENABLE: usize = 0;
const GATE_REG_GROUP_BASE: usize = 1;

/// 处理组
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateGroup {
    Group3aa0 = 0,
    Group3aa1 = 1,
    GroupIsp = 2,
    GroupDis = 3,
}

impl GateGroup {
    pub const COUNT: usize = 4;
}

impl fmt::Display for GateGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateGroup::Group3aa0 => write!(f, "3AA0"),
            GateGroup::Group3aa1 => write!(f, "3AA1"),
            GateGroup::GroupIsp => write!(f, "ISP"),
            GateGroup::GroupDis => write!(f, "DIS"),
        }
    }
}

/// 单组门控信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupGate {
    /// 组开始处理时打开的 IP
    pub mask_on: u32,
    /// 组空闲时关闭的 IP
    pub mask_off: u32,
}

/// 门控表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockGateTable {
    groups: [GroupGate; GateGroup::COUNT],
}

impl Default for ClockGateTable {
    fn default() -> Self {
        ClockGateTable {
            groups: [
                GroupGate {
                    mask_on: GATE_IP_3AA,
                    mask_off: GATE_IP_3AA,
                },
                GroupGate {
                    mask_on: GATE_IP_3AA,
                    mask_off: GATE_IP_3AA,
                },
                GroupGate {
                    mask_on: GATE_IP_ISP | GATE_IP_DRC | GATE_IP_SCC | GATE_IP_FD,
                    mask_off: GATE_IP_DRC | GATE_IP_SCC | GATE_IP_FD,
                },
                GroupGate {
                    mask_on: GATE_IP_DIS | GATE_IP_3DNR | GATE_IP_SCP,
                    mask_off: GATE_IP_DIS | GATE_IP_3DNR | GATE_IP_SCP,
                },
            ],
        }
    }
}

impl ClockGateTable {
    /// 表占用的寄存器字数
    pub const REG_WORDS: usize = GATE_REG_GROUP_BASE + 2 * GateGroup::COUNT;

    pub fn group(&self, group: GateGroup) -> GroupGate {
        self.groups[group as usize]
    }

    pub fn set_group(&mut self, group: GateGroup, gate: GroupGate) {
        self.groups[group as usize] = gate;
    }

    /// 写入寄存器区; 先写各组掩码, 最后写使能字
    pub fn program(&self, regs: &mut [u32]) -> Result<(), &'static str> {
        if regs.len() < Self::REG_WORDS {
            return Err("Clock gate register bank too small");
        }

        for (i, gate) in self.groups.iter().enumerate() {
            let on = GATE_REG_GROUP_BASE + 2 * i;
            Volatile::new(&mut regs[on]).write(gate.mask_on);
            Volatile::new(&mut regs[on + 1]).write(gate.mask_off);
        }

        Volatile::new(&mut regs[GATE_REG_ENABLE]).write(1);
        Ok(())
    }

    /// 关闭门控 (只清使能字)
    pub fn disable(regs: &mut [u32]) {
        if let Some(reg) = regs.get_mut(GATE_REG_ENABLE) {
            Volatile::new(reg).write(0);
        }
    }
}
