//! 每个相机实例的 DVFS 控制
//!
//! 管道配置变化 (格式, 帧率, reprocessing) 或每帧调用 `update`.
//! 每次都把生效场景交给 QoS 应用层, 重复写入由应用层的逐轴缓存过滤;
//! 全局销毁/重建或其它实例下发过别的场景之后仍能回到本实例的场景

use alloc::sync::Arc;

use crate::error::ApplyError;
use crate::kernel::dvfs::{DvfsClassifier, QosApplier, RuntimeSnapshot, ScenarioId};

pub struct DvfsController {
    classifier: DvfsClassifier,
    qos: Arc<QosApplier>,
    /// 上一次成功下发的场景 (只用于日志和查询)
    applied: Option<ScenarioId>,
}

impl DvfsController {
    pub fn new(classifier: DvfsClassifier, qos: Arc<QosApplier>) -> Self {
        DvfsController {
            classifier,
            qos,
            applied: None,
        }
    }

    pub fn classifier(&self) -> &DvfsClassifier {
        &self.classifier
    }

    pub fn applied(&self) -> Option<ScenarioId> {
        self.applied
    }

    /// 分类并下发; 返回当前生效场景
    ///
    /// 下发失败时不记录为已应用, 下一次调用会重试失败的轴
    pub fn update(&mut self, snapshot: &RuntimeSnapshot) -> Result<ScenarioId, ApplyError> {
        let (static_id, dynamic_id) = self.classifier.classify(snapshot);
        let target = self.classifier.effective();

        if self.applied != Some(target) {
            log::info!(
                "[DVFS] scenario {} (static {}, dynamic {:?})",
                target,
                static_id,
                dynamic_id
            );
        }

        self.applied = None;
        self.qos.apply(target)?;
        self.applied = Some(target);
        Ok(target)
    }

    /// 流停止后回到默认场景
    pub fn reset(&mut self) -> Result<(), ApplyError> {
        self.applied = None;
        self.qos.apply(ScenarioId::Default)?;
        self.applied = Some(ScenarioId::Default);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DebugFlags, DvfsConfig};
    use crate::kernel::dvfs::qos::mock::{active_applier, QosEvent};
    use crate::kernel::dvfs::{PerfTable, QosAxis, SensorPosition};

    #[test]
    fn test_capture_burst_then_back_to_preview() {
        let (qos, events) = active_applier(PerfTable::default(), DebugFlags::default(), None);
        let config = DvfsConfig {
            keep_frame_tick: 2,
            ..Default::default()
        };
        let mut ctrl = DvfsController::new(DvfsClassifier::with_defaults(&config), Arc::new(qos));

        let preview = RuntimeSnapshot::new(SensorPosition::Rear, 4032, 3024, 30);
        assert_eq!(ctrl.update(&preview), Ok(ScenarioId::RearPreviewUhd));

        let capture = RuntimeSnapshot {
            reprocessing: true,
            ..preview
        };
        assert_eq!(ctrl.update(&capture), Ok(ScenarioId::RearCapture));
        assert_eq!(ctrl.update(&preview), Ok(ScenarioId::RearCapture));
        assert_eq!(ctrl.update(&preview), Ok(ScenarioId::RearCapture));
        assert_eq!(ctrl.update(&preview), Ok(ScenarioId::RearPreviewUhd));
        assert_eq!(ctrl.applied(), Some(ScenarioId::RearPreviewUhd));

        // 预览 UHD 与拍照的性能点相同, 切换不产生重复写
        let int_writes = events
            .lock()
            .iter()
            .filter(|e| matches!(e, QosEvent::Update(QosAxis::Int, _)))
            .count();
        assert_eq!(int_writes, 1);
    }

    #[test]
    fn test_failed_apply_is_retried() {
        let (qos, _events) =
            active_applier(PerfTable::default(), DebugFlags::default(), Some(QosAxis::Mif));
        let mut ctrl = DvfsController::new(
            DvfsClassifier::with_defaults(&DvfsConfig::default()),
            Arc::new(qos),
        );
        let preview = RuntimeSnapshot::new(SensorPosition::Front, 1920, 1080, 30);
        assert!(ctrl.update(&preview).is_err());
        assert_eq!(ctrl.applied(), None);
        assert!(ctrl.update(&preview).is_err());
    }

    #[test]
    fn test_reset_applies_default() {
        let (qos, _events) = active_applier(PerfTable::default(), DebugFlags::default(), None);
        let qos = Arc::new(qos);
        let mut ctrl = DvfsController::new(
            DvfsClassifier::with_defaults(&DvfsConfig::default()),
            qos.clone(),
        );
        ctrl.update(&RuntimeSnapshot::new(SensorPosition::Front, 1280, 720, 30))
            .unwrap();
        ctrl.reset().unwrap();
        assert_eq!(ctrl.applied(), Some(ScenarioId::Default));
        assert_eq!(
            qos.last_applied(QosAxis::Int),
            qos.lookup(ScenarioId::Default, QosAxis::Int)
        );
    }

    #[test]
    fn test_restores_scenario_after_other_instance() {
        let (qos, events) = active_applier(PerfTable::default(), DebugFlags::default(), None);
        let qos = Arc::new(qos);
        let mut rear = DvfsController::new(
            DvfsClassifier::with_defaults(&DvfsConfig::default()),
            qos.clone(),
        );
        let snapshot = RuntimeSnapshot::new(SensorPosition::Rear, 1920, 1080, 30);
        assert_eq!(rear.update(&snapshot), Ok(ScenarioId::RearPreviewFhd));

        // 另一个实例把共享的 QoS 切到了别的场景
        qos.apply(ScenarioId::RearPreviewUhd).unwrap();
        events.lock().clear();

        assert_eq!(rear.update(&snapshot), Ok(ScenarioId::RearPreviewFhd));
        let mif = qos.lookup(ScenarioId::RearPreviewFhd, QosAxis::Mif);
        assert_eq!(qos.last_applied(QosAxis::Mif), mif);
        assert!(events.lock().contains(&QosEvent::Update(QosAxis::Mif, mif)));
    }
}
