//! QoS 应用层
//!
//! 把场景 ID 翻译成各轴的性能值并下发. 只写非零且与上次不同的值;
//! I2C 轴的修改需要在 I2C 频率锁内进行, 其它轴不需要.

use alloc::boxed::Box;

use super::perf_table::{PerfTable, QosAxis};
use super::scenario::ScenarioId;
use crate::config::DebugFlags;
use crate::error::ApplyError;

/// PM-QoS 请求接口 (协作层)
pub trait QosSink: Send + Sync {
    fn add_request(&self, axis: QosAxis) -> Result<(), &'static str>;

    fn remove_request(&self, axis: QosAxis);

    fn update(&self, axis: QosAxis, value: u32) -> Result<(), &'static str>;
}

/// I2C 总线频率切换的加锁/解锁 (通知固件暂停 I2C 事务)
pub trait I2cBusLock: Send + Sync {
    fn lock(&self, freq: u32) -> Result<(), &'static str>;

    fn unlock(&self, freq: u32);
}

/// I2C 频率锁; 离开作用域时解锁
pub struct I2cFreqGuard<'a> {
    _lock: spin::MutexGuard<'a, ()>,
    bus: &'a dyn I2cBusLock,
    freq: u32,
}

impl Drop for I2cFreqGuard<'_> {
    fn drop(&mut self) {
        self.bus.unlock(self.freq);
    }
}

struct QosState {
    table_index: usize,
    /// 每个轴上一次成功写入的值, 0 表示尚未写入
    last: [u32; QosAxis::COUNT],
    requests_active: bool,
}

pub struct QosApplier {
    table: PerfTable,
    debug: DebugFlags,
    sink: Box<dyn QosSink>,
    i2c_bus: Box<dyn I2cBusLock>,
    state: spin::Mutex<QosState>,
    i2c_lock: spin::Mutex<()>,
}

impl QosApplier {
    pub fn new(
        table: PerfTable,
        table_index: usize,
        debug: DebugFlags,
        sink: Box<dyn QosSink>,
        i2c_bus: Box<dyn I2cBusLock>,
    ) -> Self {
        QosApplier {
            table,
            debug,
            sink,
            i2c_bus,
            state: spin::Mutex::new(QosState {
                table_index,
                last: [0; QosAxis::COUNT],
                requests_active: false,
            }),
            i2c_lock: spin::Mutex::new(()),
        }
    }

    pub fn table(&self) -> &PerfTable {
        &self.table
    }

    /// 查表 (当前表索引)
    pub fn lookup(&self, id: ScenarioId, axis: QosAxis) -> u32 {
        let table_idx = self.state.lock().table_index;
        self.table.lookup(table_idx, id, axis)
    }

    pub fn set_table_index(&self, table_idx: usize) -> Result<(), ApplyError> {
        if table_idx >= self.table.table_count() {
            return Err(ApplyError::InvalidTable(table_idx));
        }
        self.state.lock().table_index = table_idx;
        log::info!("[DVFS] table index {}", table_idx);
        Ok(())
    }

    pub fn last_applied(&self, axis: QosAxis) -> u32 {
        self.state.lock().last[axis.index()]
    }

    pub fn requests_active(&self) -> bool {
        self.state.lock().requests_active
    }

    /// 注册所有轴的 QoS 请求 (全局初始化时); 失败时撤销已注册的
    pub fn add_requests(&self) -> Result<(), &'static str> {
        let mut state = self.state.lock();
        if state.requests_active {
            return Ok(());
        }

        for (i, axis) in QosAxis::ALL.iter().enumerate() {
            if let Err(reason) = self.sink.add_request(*axis) {
                log::error!("[DVFS] add {} request failed: {}", axis, reason);
                for added in QosAxis::ALL[..i].iter() {
                    self.sink.remove_request(*added);
                }
                return Err(reason);
            }
        }

        state.last = [0; QosAxis::COUNT];
        state.requests_active = true;
        Ok(())
    }

    /// 撤销所有轴的 QoS 请求 (全局销毁时)
    pub fn remove_requests(&self) {
        let mut state = self.state.lock();
        if !state.requests_active {
            return;
        }
        for axis in QosAxis::ALL {
            self.sink.remove_request(axis);
        }
        state.last = [0; QosAxis::COUNT];
        state.requests_active = false;
    }

    /// 加 I2C 频率锁
    pub fn lock_i2c(&self, freq: u32) -> Result<I2cFreqGuard<'_>, &'static str> {
        let lock = self.i2c_lock.lock();
        self.i2c_bus.lock(freq)?;
        Ok(I2cFreqGuard {
            _lock: lock,
            bus: &*self.i2c_bus,
            freq,
        })
    }

    fn update_i2c(&self, value: u32) -> Result<(), &'static str> {
        let _guard = self.lock_i2c(value)?;
        self.sink.update(QosAxis::I2c, value)
    }

    /// 应用场景
    ///
    /// 某个轴失败不影响其它轴; 返回第一个失败的轴和失败总数.
    /// QoS 请求未注册时 (全局初始化之前或销毁之后) 不写任何轴
    pub fn apply(&self, id: ScenarioId) -> Result<(), ApplyError> {
        if !self.debug.en_dvfs {
            return Ok(());
        }

        let mut state = self.state.lock();
        if !state.requests_active {
            log::debug!("[DVFS] {} not applied, no QoS requests", id);
            return Ok(());
        }

        let table_idx = state.table_index;
        if table_idx >= self.table.table_count() {
            return Err(ApplyError::InvalidTable(table_idx));
        }

        let mut first_failed = None;
        let mut failures = 0;

        for axis in QosAxis::ALL {
            let value = self.table.lookup(table_idx, id, axis);
            if value == 0 || state.last[axis.index()] == value {
                continue;
            }

            let ret = match axis {
                QosAxis::I2c => self.update_i2c(value),
                _ => self.sink.update(axis, value),
            };

            match ret {
                Ok(()) => {
                    log::debug!("[DVFS] {} {} -> {}", id, axis, value);
                    state.last[axis.index()] = value;
                }
                Err(reason) => {
                    log::error!("[DVFS] {} {} -> {} failed: {}", id, axis, value, reason);
                    failures += 1;
                    first_failed.get_or_insert(axis);
                }
            }
        }

        match first_failed {
            Some(axis) => Err(ApplyError::AxisFailed { axis, failures }),
            None => Ok(()),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::mock::{active_applier, applier, QosEvent};
    use super::*;
    use crate::kernel::dvfs::perf_table::PerformancePoint;

    fn table() -> PerfTable {
        let mut table = PerfTable::empty(2);
        table
            .set(0, ScenarioId::RearPreviewFhd, PerformancePoint::new(400, 800, 300, 0, 0, 0))
            .unwrap();
        table
            .set(0, ScenarioId::RearCapture, PerformancePoint::new(500, 800, 533, 200, 0, 0))
            .unwrap();
        table
            .set(1, ScenarioId::RearCapture, PerformancePoint::new(100, 0, 0, 0, 0, 7))
            .unwrap();
        table
    }

    #[test]
    fn test_zero_axes_never_written() {
        let (qos, events) = active_applier(table(), DebugFlags::default(), None);
        qos.apply(ScenarioId::RearPreviewFhd).unwrap();
        assert_eq!(
            *events.lock(),
            [
                QosEvent::Update(QosAxis::Int, 400),
                QosEvent::Update(QosAxis::Mif, 800),
                QosEvent::Update(QosAxis::Cam, 300),
            ]
        );
        assert_eq!(qos.last_applied(QosAxis::I2c), 0);
    }

    #[test]
    fn test_unchanged_axes_skipped() {
        let (qos, events) = active_applier(table(), DebugFlags::default(), None);
        qos.apply(ScenarioId::RearPreviewFhd).unwrap();
        events.lock().clear();

        qos.apply(ScenarioId::RearPreviewFhd).unwrap();
        assert!(events.lock().is_empty());

        // MIF 与预览相同, 不重复写
        qos.apply(ScenarioId::RearCapture).unwrap();
        assert!(!events.lock().contains(&QosEvent::Update(QosAxis::Mif, 800)));
    }

    #[test]
    fn test_i2c_bracketed_alone() {
        let (qos, events) = active_applier(table(), DebugFlags::default(), None);
        qos.apply(ScenarioId::RearCapture).unwrap();
        assert_eq!(
            *events.lock(),
            [
                QosEvent::Update(QosAxis::Int, 500),
                QosEvent::Update(QosAxis::Mif, 800),
                QosEvent::Update(QosAxis::Cam, 533),
                QosEvent::I2cLock(200),
                QosEvent::Update(QosAxis::I2c, 200),
                QosEvent::I2cUnlock(200),
            ]
        );
        assert!(!qos.i2c_lock.is_locked());
    }

    #[test]
    fn test_failed_axis_does_not_stop_others() {
        let (qos, events) = active_applier(table(), DebugFlags::default(), Some(QosAxis::Mif));
        assert_eq!(
            qos.apply(ScenarioId::RearCapture),
            Err(ApplyError::AxisFailed {
                axis: QosAxis::Mif,
                failures: 1
            })
        );
        assert!(events.lock().contains(&QosEvent::Update(QosAxis::Cam, 533)));
        assert!(events.lock().contains(&QosEvent::Update(QosAxis::I2c, 200)));
        assert_eq!(qos.last_applied(QosAxis::Mif), 0);
    }

    #[test]
    fn test_i2c_failure_still_unlocks() {
        let (qos, events) = active_applier(table(), DebugFlags::default(), Some(QosAxis::I2c));
        assert!(qos.apply(ScenarioId::RearCapture).is_err());
        let log = events.lock();
        assert_eq!(log.last(), Some(&QosEvent::I2cUnlock(200)));
        assert!(!qos.i2c_lock.is_locked());
    }

    #[test]
    fn test_dvfs_disabled_is_noop() {
        let debug = DebugFlags {
            en_dvfs: false,
            ..Default::default()
        };
        let (qos, events) = active_applier(table(), debug, None);
        qos.apply(ScenarioId::RearCapture).unwrap();
        assert!(events.lock().is_empty());
    }

    #[test]
    fn test_table_index() {
        let (qos, events) = active_applier(table(), DebugFlags::default(), None);
        assert_eq!(qos.set_table_index(2), Err(ApplyError::InvalidTable(2)));
        qos.set_table_index(1).unwrap();
        assert_eq!(qos.lookup(ScenarioId::RearCapture, QosAxis::Pwm), 7);
        qos.apply(ScenarioId::RearCapture).unwrap();
        assert_eq!(
            *events.lock(),
            [
                QosEvent::Update(QosAxis::Int, 100),
                QosEvent::Update(QosAxis::Pwm, 7),
            ]
        );
    }

    #[test]
    fn test_request_lifecycle() {
        let (qos, events) = applier(table(), DebugFlags::default(), None);
        qos.add_requests().unwrap();
        qos.add_requests().unwrap();
        assert!(qos.requests_active());
        assert_eq!(events.lock().len(), QosAxis::COUNT);

        qos.apply(ScenarioId::RearPreviewFhd).unwrap();
        qos.remove_requests();
        assert!(!qos.requests_active());
        assert_eq!(qos.last_applied(QosAxis::Int), 0);
        assert_eq!(
            events.lock().iter().filter(|e| matches!(e, QosEvent::Remove(_))).count(),
            QosAxis::COUNT
        );
    }

    #[test]
    fn test_apply_without_requests_writes_nothing() {
        let (qos, events) = applier(table(), DebugFlags::default(), None);
        assert!(!qos.requests_active());
        qos.apply(ScenarioId::RearCapture).unwrap();
        assert!(events.lock().is_empty());
        assert_eq!(qos.last_applied(QosAxis::Int), 0);

        qos.add_requests().unwrap();
        qos.apply(ScenarioId::RearCapture).unwrap();
        qos.remove_requests();
        events.lock().clear();

        qos.apply(ScenarioId::RearPreviewFhd).unwrap();
        assert!(events.lock().is_empty());
    }

    #[test]
    fn test_reapply_after_request_cycle() {
        let (qos, events) = active_applier(table(), DebugFlags::default(), None);
        qos.apply(ScenarioId::RearPreviewFhd).unwrap();
        qos.remove_requests();
        qos.add_requests().unwrap();
        events.lock().clear();

        // 缓存已清空, 同一场景会重新写入
        qos.apply(ScenarioId::RearPreviewFhd).unwrap();
        assert!(events.lock().contains(&QosEvent::Update(QosAxis::Mif, 800)));
    }
}
