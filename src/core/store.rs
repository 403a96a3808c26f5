use std::collections::HashMap;
use std::path::PathBuf;
use async_trait::async_trait;
use tokio::sync::Mutex;
use super::errors::Result;
use super::types::{TaskId, TaskPatch, UploadTask};

/// 任务存储：持久化的任务记录集合，进程重启后仍是事实来源。
///
/// `update_task` / `remove_task` 对不存在的 id 是 no-op（清理竞态下
/// 允许重复删除）。`get_pending_tasks` 的顺序不作保证。
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn add_task(&self, task: UploadTask) -> Result<()>;

    async fn update_task(&self, id: TaskId, patch: TaskPatch) -> Result<()>;

    async fn remove_task(&self, id: TaskId) -> Result<()>;

    async fn get_task(&self, id: TaskId) -> Result<Option<UploadTask>>;

    /// 未完成的任务（pending / processing / uploading）
    async fn get_pending_tasks(&self) -> Result<Vec<UploadTask>>;
}

/// 纯内存实现，测试和单进程演示用
#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: Mutex<HashMap<TaskId, UploadTask>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn add_task(&self, task: UploadTask) -> Result<()> {
        self.tasks.lock().await.insert(task.id, task);
        Ok(())
    }

    async fn update_task(&self, id: TaskId, patch: TaskPatch) -> Result<()> {
        if let Some(task) = self.tasks.lock().await.get_mut(&id) {
            patch.apply(task);
        }
        Ok(())
    }

    async fn remove_task(&self, id: TaskId) -> Result<()> {
        self.tasks.lock().await.remove(&id);
        Ok(())
    }

    async fn get_task(&self, id: TaskId) -> Result<Option<UploadTask>> {
        Ok(self.tasks.lock().await.get(&id).cloned())
    }

    async fn get_pending_tasks(&self) -> Result<Vec<UploadTask>> {
        let tasks = self.tasks.lock().await;
        Ok(tasks
            .values()
            .filter(|task| task.status.is_unfinished())
            .cloned()
            .collect())
    }
}

/// JSON 文件实现：每次变更后整体重写状态文件。
/// 底层存储引擎不是这里的关注点，只要求写入先于下一次读可见。
pub struct JsonTaskStore {
    path: PathBuf,
    tasks: Mutex<HashMap<TaskId, UploadTask>>,
}

impl JsonTaskStore {
    /// 打开状态文件，存在则恢复其中的任务
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut tasks = HashMap::new();

        if tokio::fs::try_exists(&path).await? {
            let data = tokio::fs::read_to_string(&path).await?;
            if !data.trim().is_empty() {
                let restored: Vec<UploadTask> = serde_json::from_str(&data)?;
                for task in restored {
                    tasks.insert(task.id, task);
                }
            }
        }

        Ok(Self {
            path,
            tasks: Mutex::new(tasks),
        })
    }

    /// Save tasks state
    async fn save(&self, tasks: &HashMap<TaskId, UploadTask>) -> Result<()> {
        let records: Vec<_> = tasks.values().collect();
        let data = serde_json::to_string_pretty(&records)?;
        tokio::fs::write(&self.path, data).await?;
        Ok(())
    }
}

#[async_trait]
impl TaskStore for JsonTaskStore {
    async fn add_task(&self, task: UploadTask) -> Result<()> {
        let mut tasks = self.tasks.lock().await;
        tasks.insert(task.id, task);
        self.save(&tasks).await
    }

    async fn update_task(&self, id: TaskId, patch: TaskPatch) -> Result<()> {
        let mut tasks = self.tasks.lock().await;
        match tasks.get_mut(&id) {
            Some(task) => {
                patch.apply(task);
                self.save(&tasks).await
            }
            None => Ok(()),
        }
    }

    async fn remove_task(&self, id: TaskId) -> Result<()> {
        let mut tasks = self.tasks.lock().await;
        match tasks.remove(&id) {
            Some(_) => self.save(&tasks).await,
            None => Ok(()),
        }
    }

    async fn get_task(&self, id: TaskId) -> Result<Option<UploadTask>> {
        Ok(self.tasks.lock().await.get(&id).cloned())
    }

    async fn get_pending_tasks(&self) -> Result<Vec<UploadTask>> {
        let tasks = self.tasks.lock().await;
        Ok(tasks
            .values()
            .filter(|task| task.status.is_unfinished())
            .cloned()
            .collect())
    }
}
