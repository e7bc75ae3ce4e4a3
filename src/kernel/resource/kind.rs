//! 资源种类与设备句柄

use core::fmt;

/// 资源域种类
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// 后置传感器
    Sensor0 = 0,
    /// 前置传感器
    Sensor1 = 1,
    /// ISP 处理链
    IsChain = 2,
    /// Companion 协处理器
    Companion = 3,
}

impl ResourceKind {
    /// 资源种类数
    pub const COUNT: usize = 4;

    /// 所有种类, 按槽位顺序
    pub const ALL: [ResourceKind; ResourceKind::COUNT] = [
        ResourceKind::Sensor0,
        ResourceKind::Sensor1,
        ResourceKind::IsChain,
        ResourceKind::Companion,
    ];

    /// 槽位索引
    pub fn index(self) -> usize {
        self as usize
    }

    /// 对应的上电标志位
    pub fn power_flag(self) -> PowerFlags {
        match self {
            ResourceKind::Sensor0 => PowerFlags::SENSOR0,
            ResourceKind::Sensor1 => PowerFlags::SENSOR1,
            ResourceKind::IsChain => PowerFlags::ISCHAIN,
            ResourceKind::Companion => PowerFlags::COMPANION,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Sensor0 => write!(f, "SENSOR0"),
            ResourceKind::Sensor1 => write!(f, "SENSOR1"),
            ResourceKind::IsChain => write!(f, "ISCHAIN"),
            ResourceKind::Companion => write!(f, "COMPANION"),
        }
    }
}

/// 协作层提供的设备句柄 (platform device / subdev), 注册后不可变
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceHandle(pub usize);

bitflags::bitflags! {
    /// 已执行过上电序列的资源
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PowerFlags: u32 {
        const SENSOR0 = 1 << 0;
        const SENSOR1 = 1 << 1;
        const ISCHAIN = 1 << 2;
        const COMPANION = 1 << 3;
        /// 全局初始化已完成
        const GLOBAL = 1 << 8;
    }
}
