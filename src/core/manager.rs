use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};
use crate::config::UploadConfig;
use super::errors::Result;
use super::orchestrator::{drive_task, TaskContext};
use super::store::TaskStore;
use super::traits::Collaborators;
use super::types::{TaskId, UploadCallbacks, UploadTask};

/// 发起一次后台上传的参数
pub struct StartUploadOptions {
    /// 待上传的源文件（通常在相机缓存目录，随时可能被系统清掉）
    pub source: PathBuf,
    /// 回复目标；None 表示新建 bondfire
    pub target_bondfire_id: Option<String>,
    pub collaborators: Collaborators,
    pub callbacks: UploadCallbacks,
}

/// 恢复未完成任务的参数：协作方绑定依附当前会话，必须重新注入
pub struct ResumeOptions {
    pub collaborators: Collaborators,
    pub callbacks: UploadCallbacks,
}

/// 上传管理器：进程启动时构造一次，持有任务存储的引用。
/// 每个任务由独立的 tokio 任务驱动，互相不阻塞。
pub struct UploadManager {
    store: Arc<dyn TaskStore>,
    config: UploadConfig,
    resumed: AtomicBool,
}

impl UploadManager {
    pub fn new(store: Arc<dyn TaskStore>, config: UploadConfig) -> Self {
        Self {
            store,
            config,
            resumed: AtomicBool::new(false),
        }
    }

    /// 发起后台上传。先把源文件拷贝到持久目录并落库一条任务，
    /// 然后立即返回任务 ID，管线在后台异步执行。
    ///
    /// 源文件缺失是唯一同步失败的情况（此时还没有任务可以承载状态）。
    pub async fn start_background_upload(&self, options: StartUploadOptions) -> Result<TaskId> {
        let persistent_path = options
            .collaborators
            .files
            .copy_to_persistent(&options.source)
            .await?;

        let task = UploadTask::new(persistent_path, options.target_bondfire_id);
        let id = task.id;
        self.store.add_task(task).await?;

        info!(task = %id, "background upload started");
        self.spawn_driver(id, options.collaborators, options.callbacks);

        Ok(id)
    }

    /// 进程启动时恢复所有未完成任务，返回恢复的数量。
    /// 每个进程生命周期只生效一次；重复调用是 no-op（UI 挂载点
    /// 可能重复触发）。
    pub async fn resume_pending_uploads(&self, options: ResumeOptions) -> Result<usize> {
        if self.resumed.swap(true, Ordering::SeqCst) {
            debug!("resume already ran in this process, ignoring");
            return Ok(0);
        }

        let pending = self.store.get_pending_tasks().await?;
        info!(count = pending.len(), "resuming pending uploads");

        for task in &pending {
            self.spawn_driver(
                task.id,
                options.collaborators.clone(),
                options.callbacks.clone(),
            );
        }

        Ok(pending.len())
    }

    fn spawn_driver(&self, id: TaskId, collaborators: Collaborators, callbacks: UploadCallbacks) {
        let context = TaskContext {
            store: self.store.clone(),
            collaborators,
            callbacks,
            config: self.config.clone(),
        };
        tokio::spawn(drive_task(context, id));
    }
}
