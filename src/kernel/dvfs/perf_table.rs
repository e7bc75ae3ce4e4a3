//! 性能点查找表
//!
//! 三维表: (表索引, 场景, 轴) → 频率/档位. 0 表示 "不修改该轴".
//! 表由编译期默认值或设备树解析结果 (`PerfTableEntry`) 构造.

use alloc::vec::Vec;
use core::fmt;

use super::scenario::ScenarioId;

/// QoS 轴
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QosAxis {
    Int = 0,
    Mif = 1,
    Cam = 2,
    I2c = 3,
    Disp = 4,
    Pwm = 5,
}

impl QosAxis {
    pub const COUNT: usize = 6;

    /// 应用顺序
    pub const ALL: [QosAxis; QosAxis::COUNT] = [
        QosAxis::Int,
        QosAxis::Mif,
        QosAxis::Cam,
        QosAxis::I2c,
        QosAxis::Disp,
        QosAxis::Pwm,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for QosAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QosAxis::Int => write!(f, "INT"),
            QosAxis::Mif => write!(f, "MIF"),
            QosAxis::Cam => write!(f, "CAM"),
            QosAxis::I2c => write!(f, "I2C"),
            QosAxis::Disp => write!(f, "DISP"),
            QosAxis::Pwm => write!(f, "PWM"),
        }
    }
}

/// 一个场景的性能点
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerformancePoint {
    pub int_qos: u32,
    pub mif_qos: u32,
    pub cam_qos: u32,
    pub i2c_qos: u32,
    pub disp_qos: u32,
    pub pwm_qos: u32,
}

impl PerformancePoint {
    pub const fn new(
        int_qos: u32,
        mif_qos: u32,
        cam_qos: u32,
        i2c_qos: u32,
        disp_qos: u32,
        pwm_qos: u32,
    ) -> Self {
        PerformancePoint {
            int_qos,
            mif_qos,
            cam_qos,
            i2c_qos,
            disp_qos,
            pwm_qos,
        }
    }

    pub fn get(&self, axis: QosAxis) -> u32 {
        match axis {
            QosAxis::Int => self.int_qos,
            QosAxis::Mif => self.mif_qos,
            QosAxis::Cam => self.cam_qos,
            QosAxis::I2c => self.i2c_qos,
            QosAxis::Disp => self.disp_qos,
            QosAxis::Pwm => self.pwm_qos,
        }
    }
}

/// 设备树解析后的一条记录 (解析本身由协作层完成)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerfTableEntry<'a> {
    pub table: usize,
    /// 场景名, 例如 "rear_preview_fhd"
    pub scenario: &'a str,
    pub point: PerformancePoint,
}

type ScenarioRow = [PerformancePoint; ScenarioId::COUNT];

/// 性能表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerfTable {
    tables: Vec<ScenarioRow>,
}

// 单位 KHz; PWM/DISP 默认不设置
const DEFAULT_POINTS: [(ScenarioId, PerformancePoint); ScenarioId::COUNT] = [
    (ScenarioId::Default, PerformancePoint::new(534_000, 1_552_000, 533_000, 0, 0, 0)),
    (ScenarioId::FrontPreview, PerformancePoint::new(413_000, 825_000, 267_000, 0, 0, 0)),
    (ScenarioId::FrontCapture, PerformancePoint::new(534_000, 1_552_000, 533_000, 0, 0, 0)),
    (ScenarioId::FrontCamcording, PerformancePoint::new(413_000, 1_014_000, 267_000, 0, 0, 0)),
    (ScenarioId::FrontVt1, PerformancePoint::new(200_000, 543_000, 160_000, 0, 0, 0)),
    (ScenarioId::FrontVt2, PerformancePoint::new(200_000, 543_000, 160_000, 0, 0, 0)),
    (ScenarioId::RearPreviewFhd, PerformancePoint::new(413_000, 1_014_000, 333_000, 0, 0, 0)),
    (ScenarioId::RearPreviewWhd, PerformancePoint::new(413_000, 1_264_000, 333_000, 0, 0, 0)),
    (ScenarioId::RearPreviewUhd, PerformancePoint::new(534_000, 1_552_000, 533_000, 0, 0, 0)),
    (ScenarioId::RearCapture, PerformancePoint::new(534_000, 1_552_000, 533_000, 0, 0, 0)),
    (ScenarioId::RearCamcordingFhd, PerformancePoint::new(413_000, 1_014_000, 333_000, 0, 0, 0)),
    (ScenarioId::RearCamcordingUhd, PerformancePoint::new(534_000, 1_552_000, 533_000, 0, 0, 0)),
    (ScenarioId::DualPreview, PerformancePoint::new(534_000, 1_552_000, 533_000, 0, 0, 0)),
    (ScenarioId::DualCapture, PerformancePoint::new(534_000, 1_552_000, 533_000, 0, 0, 0)),
    (ScenarioId::DualCamcording, PerformancePoint::new(534_000, 1_552_000, 533_000, 0, 0, 0)),
    (ScenarioId::HighSpeedFps, PerformancePoint::new(534_000, 1_552_000, 533_000, 0, 0, 0)),
];

impl Default for PerfTable {
    fn default() -> Self {
        let mut row = [PerformancePoint::default(); ScenarioId::COUNT];
        for (id, point) in DEFAULT_POINTS.iter() {
            row[id.index()] = *point;
        }
        PerfTable { tables: alloc::vec![row] }
    }
}

impl PerfTable {
    /// 全零表 (所有轴都不设置)
    pub fn empty(table_count: usize) -> Self {
        PerfTable {
            tables: alloc::vec![[PerformancePoint::default(); ScenarioId::COUNT]; table_count],
        }
    }

    /// 由设备树记录构造; 未知场景名会被忽略并记录
    pub fn from_entries(entries: &[PerfTableEntry<'_>]) -> Result<Self, &'static str> {
        let count = entries
            .iter()
            .map(|e| e.table + 1)
            .max()
            .ok_or("No DVFS table entries")?;

        let mut table = PerfTable::empty(count);
        for entry in entries {
            match ScenarioId::from_name(entry.scenario) {
                Some(id) => table.set(entry.table, id, entry.point)?,
                None => log::warn!(
                    "[DVFS] unknown scenario '{}' in table {}",
                    entry.scenario,
                    entry.table
                ),
            }
        }
        Ok(table)
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn set(
        &mut self,
        table_idx: usize,
        id: ScenarioId,
        point: PerformancePoint,
    ) -> Result<(), &'static str> {
        let row = self
            .tables
            .get_mut(table_idx)
            .ok_or("DVFS table index out of range")?;
        row[id.index()] = point;
        Ok(())
    }

    pub fn point(&self, table_idx: usize, id: ScenarioId) -> Option<PerformancePoint> {
        self.tables.get(table_idx).map(|row| row[id.index()])
    }

    /// 查表; 越界返回 0 (不修改)
    pub fn lookup(&self, table_idx: usize, id: ScenarioId, axis: QosAxis) -> u32 {
        self.point(table_idx, id).map(|p| p.get(axis)).unwrap_or(0)
    }
}
