//! 相机核心
//!
//! 持有资源管理器和共享的 QoS 应用层. 全局初始化 (第一个资源被获取时)
//! 分配共享内存、注册 QoS 请求并应用默认场景; 最后一个资源释放时反向销毁.
//!
//! 进程内只有一个实例, 由 `core_init` / `core_shutdown` 显式管理.

use alloc::boxed::Box;
use alloc::sync::Arc;
use core::fmt;

use crate::config::{DvfsConfig, ResourceConfig};
use crate::drivers::power::GlobalHooks;
use crate::error::CoreError;
use crate::kernel::dvfs::{
    DvfsClassifier, I2cBusLock, PerfTable, QosApplier, QosSink, ScenarioId,
};
use crate::kernel::resource::ResourceManager;
use crate::system::dvfs_ctrl::DvfsController;

/// 与固件共享的内存区域 (协作层)
pub trait SharedMemory: Send + Sync {
    fn alloc(&self) -> Result<(), &'static str>;

    fn free(&self);
}

/// 外部协作者
pub struct Collaborators {
    pub sink: Box<dyn QosSink>,
    pub i2c_bus: Box<dyn I2cBusLock>,
    pub memory: Box<dyn SharedMemory>,
}

/// 全局初始化/销毁钩子
pub struct CoreHooks {
    qos: Arc<QosApplier>,
    memory: Box<dyn SharedMemory>,
}

impl CoreHooks {
    pub fn new(qos: Arc<QosApplier>, memory: Box<dyn SharedMemory>) -> Self {
        CoreHooks { qos, memory }
    }
}

impl GlobalHooks for CoreHooks {
    fn global_init(&self) -> Result<(), &'static str> {
        self.memory.alloc()?;

        if let Err(reason) = self.qos.add_requests() {
            self.memory.free();
            return Err(reason);
        }

        // 默认场景失败不阻止上电
        if let Err(err) = self.qos.apply(ScenarioId::Default) {
            log::warn!("[CORE] default scenario not applied: {}", err);
        }
        Ok(())
    }

    fn global_teardown(&self) {
        self.qos.remove_requests();
        self.memory.free();
    }
}

pub struct CameraCore {
    resources: ResourceManager,
    qos: Arc<QosApplier>,
    dvfs_config: DvfsConfig,
}

impl CameraCore {
    pub fn new(
        resource_config: ResourceConfig,
        dvfs_config: DvfsConfig,
        table: PerfTable,
        collaborators: Collaborators,
    ) -> Self {
        let Collaborators {
            sink,
            i2c_bus,
            memory,
        } = collaborators;

        let qos = Arc::new(QosApplier::new(
            table,
            dvfs_config.table_index,
            resource_config.debug,
            sink,
            i2c_bus,
        ));
        let hooks = CoreHooks::new(qos.clone(), memory);

        CameraCore {
            resources: ResourceManager::new(resource_config, Box::new(hooks)),
            qos,
            dvfs_config,
        }
    }

    pub fn resources(&self) -> &ResourceManager {
        &self.resources
    }

    pub fn qos(&self) -> &Arc<QosApplier> {
        &self.qos
    }

    /// 新相机实例的 DVFS 控制器 (内置场景表)
    pub fn dvfs_controller(&self) -> DvfsController {
        DvfsController::new(
            DvfsClassifier::with_defaults(&self.dvfs_config),
            self.qos.clone(),
        )
    }
}

impl fmt::Display for CameraCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, qos requests {}",
            self.resources.status(),
            if self.qos.requests_active() { "on" } else { "off" }
        )
    }
}

use lazy_static::lazy_static;

lazy_static! {
    static ref CORE: spin::Mutex<Option<Arc<CameraCore>>> = spin::Mutex::new(None);
}

/// 安装全局实例
pub fn core_init(camera: CameraCore) -> Result<Arc<CameraCore>, CoreError> {
    let mut slot = CORE.lock();
    if slot.is_some() {
        return Err(CoreError::AlreadyInitialized);
    }
    let camera = Arc::new(camera);
    *slot = Some(camera.clone());
    log::info!("[CORE] initialized");
    Ok(camera)
}

pub fn core() -> Option<Arc<CameraCore>> {
    CORE.lock().clone()
}

/// 卸载全局实例; 仍有资源被持有时拒绝
pub fn core_shutdown() -> Result<(), CoreError> {
    let mut slot = CORE.lock();
    let held = match slot.as_ref() {
        Some(camera) => camera.resources.total_ref_count(),
        None => return Err(CoreError::NotInitialized),
    };
    if held > 0 {
        log::warn!("[CORE] shutdown refused, {} resources held", held);
        return Err(CoreError::Busy(held));
    }
    *slot = None;
    log::info!("[CORE] shut down");
    Ok(())
}
