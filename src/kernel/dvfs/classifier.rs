//! DVFS 场景分类器
//!
//! 静态/动态两个控制器, 各自按声明顺序逐个判定, 第一个命中者胜出.
//! 动态场景命中后保持 `keep_frame_tick` 帧, 期间无新命中则过期.

use alloc::vec::Vec;

use super::scenario::{DvfsScenario, RuntimeSnapshot, ScenarioId, KEEP_FRAME_TICK_NONE};
use super::scenarios_default::{default_dynamic_scenarios, default_static_scenarios};
use crate::config::DvfsConfig;

/// 单类场景 (静态或动态) 的控制器
#[derive(Debug)]
pub struct DvfsScenarioCtrl {
    scenarios: Vec<DvfsScenario>,
    cur_scenario_id: Option<ScenarioId>,
    cur_scenario_idx: Option<usize>,
    cur_frame_tick: i32,
}

impl DvfsScenarioCtrl {
    /// 按声明顺序建立场景表, 优先级即下标
    pub fn new(scenarios: &[DvfsScenario]) -> Self {
        let scenarios = scenarios
            .iter()
            .enumerate()
            .map(|(i, s)| DvfsScenario {
                priority: i as u32,
                ..*s
            })
            .collect();

        DvfsScenarioCtrl {
            scenarios,
            cur_scenario_id: None,
            cur_scenario_idx: None,
            cur_frame_tick: KEEP_FRAME_TICK_NONE,
        }
    }

    pub fn scenarios(&self) -> &[DvfsScenario] {
        &self.scenarios
    }

    pub fn cur_scenario_id(&self) -> Option<ScenarioId> {
        self.cur_scenario_id
    }

    pub fn cur_scenario_idx(&self) -> Option<usize> {
        self.cur_scenario_idx
    }

    pub fn cur_frame_tick(&self) -> i32 {
        self.cur_frame_tick
    }

    fn first_match(&self, snapshot: &RuntimeSnapshot) -> Option<(usize, &DvfsScenario)> {
        self.scenarios
            .iter()
            .enumerate()
            .find(|(_, scenario)| scenario.matches(snapshot))
    }

    /// 静态场景选择; 无命中时返回 `Default`
    pub fn classify_static(&mut self, snapshot: &RuntimeSnapshot) -> ScenarioId {
        match self.first_match(snapshot).map(|(i, s)| (i, s.id, s.name)) {
            Some((idx, id, name)) => {
                if self.cur_scenario_id != Some(id) {
                    log::debug!("[DVFS] static scenario -> {}", name);
                }
                self.cur_scenario_id = Some(id);
                self.cur_scenario_idx = Some(idx);
                self.cur_frame_tick = KEEP_FRAME_TICK_NONE;
                id
            }
            None => {
                self.cur_scenario_id = Some(ScenarioId::Default);
                self.cur_scenario_idx = None;
                self.cur_frame_tick = KEEP_FRAME_TICK_NONE;
                ScenarioId::Default
            }
        }
    }

    /// 动态场景选择
    ///
    /// 先推进保持计数 (降到 0 以下即过期), 非 reprocessing 路径直接返回
    /// `None`; 否则返回本次新命中的场景
    pub fn classify_dynamic(&mut self, snapshot: &RuntimeSnapshot) -> Option<ScenarioId> {
        if self.cur_frame_tick >= 0 {
            self.cur_frame_tick -= 1;
            if self.cur_frame_tick < 0 {
                log::debug!("[DVFS] dynamic scenario expired");
                self.cur_scenario_id = None;
                self.cur_scenario_idx = None;
            }
        }

        if !snapshot.reprocessing {
            return None;
        }

        let (idx, id, keep, name) = self
            .first_match(snapshot)
            .map(|(i, s)| (i, s.id, s.keep_frame_tick, s.name))?;

        log::debug!("[DVFS] dynamic scenario -> {} (keep {})", name, keep);
        self.cur_scenario_id = Some(id);
        self.cur_scenario_idx = Some(idx);
        self.cur_frame_tick = keep;
        Some(id)
    }
}

/// 静态 + 动态分类器, 每个相机实例一份
#[derive(Debug)]
pub struct DvfsClassifier {
    static_ctrl: DvfsScenarioCtrl,
    dynamic_ctrl: DvfsScenarioCtrl,
}

impl DvfsClassifier {
    pub fn new(static_scenarios: &[DvfsScenario], dynamic_scenarios: &[DvfsScenario]) -> Self {
        DvfsClassifier {
            static_ctrl: DvfsScenarioCtrl::new(static_scenarios),
            dynamic_ctrl: DvfsScenarioCtrl::new(dynamic_scenarios),
        }
    }

    /// 使用内置场景表
    pub fn with_defaults(config: &DvfsConfig) -> Self {
        let dynamic: Vec<DvfsScenario> = default_dynamic_scenarios()
            .iter()
            .map(|s| DvfsScenario {
                keep_frame_tick: config.keep_frame_tick,
                ..*s
            })
            .collect();
        DvfsClassifier::new(default_static_scenarios(), &dynamic)
    }

    pub fn static_ctrl(&self) -> &DvfsScenarioCtrl {
        &self.static_ctrl
    }

    pub fn dynamic_ctrl(&self) -> &DvfsScenarioCtrl {
        &self.dynamic_ctrl
    }

    /// 一轮分类: 先静态, 再把本轮静态结果交给动态判定
    pub fn classify(&mut self, snapshot: &RuntimeSnapshot) -> (ScenarioId, Option<ScenarioId>) {
        let static_id = self.static_ctrl.classify_static(snapshot);

        let snapshot = RuntimeSnapshot {
            static_scenario: Some(static_id),
            ..*snapshot
        };
        let dynamic_id = self.dynamic_ctrl.classify_dynamic(&snapshot);

        log::trace!("[DVFS] classify: static {}, dynamic {:?}", static_id, dynamic_id);
        (static_id, dynamic_id)
    }

    /// 当前生效场景: 动态场景未过期时优先, 否则回落到静态场景
    pub fn effective(&self) -> ScenarioId {
        self.dynamic_ctrl
            .cur_scenario_id()
            .or(self.static_ctrl.cur_scenario_id())
            .unwrap_or(ScenarioId::Default)
    }
}
