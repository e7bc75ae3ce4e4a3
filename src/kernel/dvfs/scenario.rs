//! DVFS 场景定义
//!
//! 场景 = (判定函数, 性能点). 判定函数只读取当前相机状态快照

use core::fmt;

/// 场景 ID (性能表的第二维)
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioId {
    /// 无匹配时的默认场景
    Default = 0,
    FrontPreview = 1,
    FrontCapture = 2,
    FrontCamcording = 3,
    FrontVt1 = 4,
    FrontVt2 = 5,
    RearPreviewFhd = 6,
    RearPreviewWhd = 7,
    RearPreviewUhd = 8,
    RearCapture = 9,
    RearCamcordingFhd = 10,
    RearCamcordingUhd = 11,
    DualPreview = 12,
    DualCapture = 13,
    DualCamcording = 14,
    HighSpeedFps = 15,
}

impl ScenarioId {
    /// 场景总数
    pub const COUNT: usize = 16;

    pub const ALL: [ScenarioId; ScenarioId::COUNT] = [
        ScenarioId::Default,
        ScenarioId::FrontPreview,
        ScenarioId::FrontCapture,
        ScenarioId::FrontCamcording,
        ScenarioId::FrontVt1,
        ScenarioId::FrontVt2,
        ScenarioId::RearPreviewFhd,
        ScenarioId::RearPreviewWhd,
        ScenarioId::RearPreviewUhd,
        ScenarioId::RearCapture,
        ScenarioId::RearCamcordingFhd,
        ScenarioId::RearCamcordingUhd,
        ScenarioId::DualPreview,
        ScenarioId::DualCapture,
        ScenarioId::DualCamcording,
        ScenarioId::HighSpeedFps,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// 设备树中的场景名
    pub const fn name(self) -> &'static str {
        match self {
            ScenarioId::Default => "default",
            ScenarioId::FrontPreview => "front_preview",
            ScenarioId::FrontCapture => "front_capture",
            ScenarioId::FrontCamcording => "front_camcording",
            ScenarioId::FrontVt1 => "front_vt1",
            ScenarioId::FrontVt2 => "front_vt2",
            ScenarioId::RearPreviewFhd => "rear_preview_fhd",
            ScenarioId::RearPreviewWhd => "rear_preview_whd",
            ScenarioId::RearPreviewUhd => "rear_preview_uhd",
            ScenarioId::RearCapture => "rear_capture",
            ScenarioId::RearCamcordingFhd => "rear_camcording_fhd",
            ScenarioId::RearCamcordingUhd => "rear_camcording_uhd",
            ScenarioId::DualPreview => "dual_preview",
            ScenarioId::DualCapture => "dual_capture",
            ScenarioId::DualCamcording => "dual_camcording",
            ScenarioId::HighSpeedFps => "high_speed_fps",
        }
    }

    pub fn from_name(name: &str) -> Option<ScenarioId> {
        ScenarioId::ALL.iter().copied().find(|id| id.name() == name)
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), *self as u32)
    }
}

/// 传感器位置
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorPosition {
    Rear = 0,
    Front = 1,
}

/// 场景模式 (setfile 子场景)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneMode {
    Preview = 0,
    Camcording = 1,
    /// 视频通话 1
    Vt1 = 2,
    /// 视频通话 2
    Vt2 = 3,
}

/// 判定函数的输入: 当前相机状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeSnapshot {
    pub position: SensorPosition,
    pub fps: u32,
    pub width: u32,
    pub height: u32,
    /// 拍照 (reprocessing) 路径是否激活
    pub reprocessing: bool,
    pub companion_open: bool,
    /// 前后传感器同时出流
    pub dual: bool,
    pub scene: SceneMode,
    /// 本轮已选出的静态场景
    pub static_scenario: Option<ScenarioId>,
}

impl RuntimeSnapshot {
    pub fn new(position: SensorPosition, width: u32, height: u32, fps: u32) -> Self {
        RuntimeSnapshot {
            position,
            fps,
            width,
            height,
            reprocessing: false,
            companion_open: false,
            dual: false,
            scene: SceneMode::Preview,
            static_scenario: None,
        }
    }

    pub fn pixels(&self) -> u32 {
        self.width.saturating_mul(self.height)
    }

    pub fn is_front(&self) -> bool {
        self.position == SensorPosition::Front
    }

    pub fn is_rear(&self) -> bool {
        self.position == SensorPosition::Rear
    }
}

/// 判定函数
pub type ScenarioPredicate = fn(&RuntimeSnapshot) -> bool;

/// 静态场景不过期
pub const KEEP_FRAME_TICK_NONE: i32 = -1;

/// 场景描述
#[derive(Clone, Copy)]
pub struct DvfsScenario {
    pub id: ScenarioId,
    /// 调试用名称
    pub name: &'static str,
    /// 声明顺序, 越小越先判定
    pub priority: u32,
    pub predicate: ScenarioPredicate,
    /// 动态场景的保持帧数; -1 表示不过期
    pub keep_frame_tick: i32,
}

impl DvfsScenario {
    pub const fn new(id: ScenarioId, predicate: ScenarioPredicate, keep_frame_tick: i32) -> Self {
        DvfsScenario {
            id,
            name: id.name(),
            priority: 0,
            predicate,
            keep_frame_tick,
        }
    }

    pub fn matches(&self, snapshot: &RuntimeSnapshot) -> bool {
        (self.predicate)(snapshot)
    }
}

impl fmt::Debug for DvfsScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DvfsScenario")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("keep_frame_tick", &self.keep_frame_tick)
            .finish()
    }
}
