//! 内置场景表
//!
//! 顺序即优先级. 注意前置 VT 必须排在通用前置预览之前,
//! 否则永远不会被选中.

use super::scenario::{
    DvfsScenario, RuntimeSnapshot, ScenarioId, SceneMode, KEEP_FRAME_TICK_NONE,
};

/// 动态场景默认保持帧数
pub const KEEP_FRAME_TICK_DEFAULT: i32 = 5;

const SIZE_FHD: u32 = 1920 * 1080;
const SIZE_WHD: u32 = 2560 * 1440;
const SIZE_UHD: u32 = 3840 * 2160;

/// 高帧率阈值
const HIGH_SPEED_FPS: u32 = 60;

// ============ 静态场景判定 ============

fn dual_camcording(s: &RuntimeSnapshot) -> bool {
    s.dual && s.scene == SceneMode::Camcording
}

fn dual_preview(s: &RuntimeSnapshot) -> bool {
    s.dual
}

fn high_speed_fps(s: &RuntimeSnapshot) -> bool {
    s.is_rear() && s.fps >= HIGH_SPEED_FPS
}

fn rear_camcording_uhd(s: &RuntimeSnapshot) -> bool {
    s.is_rear() && s.scene == SceneMode::Camcording && s.pixels() >= SIZE_UHD
}

fn rear_camcording_fhd(s: &RuntimeSnapshot) -> bool {
    s.is_rear() && s.scene == SceneMode::Camcording
}

fn rear_preview_uhd(s: &RuntimeSnapshot) -> bool {
    s.is_rear() && s.pixels() >= SIZE_UHD
}

fn rear_preview_whd(s: &RuntimeSnapshot) -> bool {
    s.is_rear() && s.pixels() >= SIZE_WHD
}

fn rear_preview_fhd(s: &RuntimeSnapshot) -> bool {
    s.is_rear() && s.pixels() <= SIZE_WHD
}

fn front_vt1(s: &RuntimeSnapshot) -> bool {
    s.is_front() && s.scene == SceneMode::Vt1
}

fn front_vt2(s: &RuntimeSnapshot) -> bool {
    s.is_front() && s.scene == SceneMode::Vt2
}

fn front_camcording(s: &RuntimeSnapshot) -> bool {
    s.is_front() && s.scene == SceneMode::Camcording
}

fn front_preview(s: &RuntimeSnapshot) -> bool {
    s.is_front()
}

// ============ 动态场景判定 ============

fn dual_capture(s: &RuntimeSnapshot) -> bool {
    s.dual
}

fn rear_capture(s: &RuntimeSnapshot) -> bool {
    s.is_rear() && s.pixels() > SIZE_FHD
}

/// 只在前置预览/录像之后触发
fn front_capture(s: &RuntimeSnapshot) -> bool {
    s.is_front()
        && matches!(
            s.static_scenario,
            Some(ScenarioId::FrontPreview) | Some(ScenarioId::FrontCamcording)
        )
}

static STATIC_SCENARIOS: [DvfsScenario; 12] = [
    DvfsScenario::new(ScenarioId::DualCamcording, dual_camcording, KEEP_FRAME_TICK_NONE),
    DvfsScenario::new(ScenarioId::DualPreview, dual_preview, KEEP_FRAME_TICK_NONE),
    DvfsScenario::new(ScenarioId::HighSpeedFps, high_speed_fps, KEEP_FRAME_TICK_NONE),
    DvfsScenario::new(ScenarioId::RearCamcordingUhd, rear_camcording_uhd, KEEP_FRAME_TICK_NONE),
    DvfsScenario::new(ScenarioId::RearCamcordingFhd, rear_camcording_fhd, KEEP_FRAME_TICK_NONE),
    DvfsScenario::new(ScenarioId::RearPreviewUhd, rear_preview_uhd, KEEP_FRAME_TICK_NONE),
    DvfsScenario::new(ScenarioId::RearPreviewWhd, rear_preview_whd, KEEP_FRAME_TICK_NONE),
    DvfsScenario::new(ScenarioId::RearPreviewFhd, rear_preview_fhd, KEEP_FRAME_TICK_NONE),
    DvfsScenario::new(ScenarioId::FrontVt1, front_vt1, KEEP_FRAME_TICK_NONE),
    DvfsScenario::new(ScenarioId::FrontVt2, front_vt2, KEEP_FRAME_TICK_NONE),
    DvfsScenario::new(ScenarioId::FrontCamcording, front_camcording, KEEP_FRAME_TICK_NONE),
    DvfsScenario::new(ScenarioId::FrontPreview, front_preview, KEEP_FRAME_TICK_NONE),
];

static DYNAMIC_SCENARIOS: [DvfsScenario; 3] = [
    DvfsScenario::new(ScenarioId::DualCapture, dual_capture, KEEP_FRAME_TICK_DEFAULT),
    DvfsScenario::new(ScenarioId::RearCapture, rear_capture, KEEP_FRAME_TICK_DEFAULT),
    DvfsScenario::new(ScenarioId::FrontCapture, front_capture, KEEP_FRAME_TICK_DEFAULT),
];

pub fn default_static_scenarios() -> &'static [DvfsScenario] {
    &STATIC_SCENARIOS
}

pub fn default_dynamic_scenarios() -> &'static [DvfsScenario] {
    &DYNAMIC_SCENARIOS
}
