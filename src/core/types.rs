use std::path::PathBuf;
use std::sync::Arc;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use super::errors::UploadError;
use super::progress::UploadStage;

/// 渲染后的视频 MIME 类型
pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";
/// 缩略图 MIME 类型
pub const THUMBNAIL_CONTENT_TYPE: &str = "image/jpeg";

/// 上传任务唯一标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 任务状态枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// 等待中（未开始或退避重试中）
    Pending,
    /// 转码中
    Processing,
    /// 上传中
    Uploading,
    /// 已完成
    Completed,
    /// 失败（重试耗尽，保留记录等待手动处理）
    Failed,
}

impl TaskStatus {
    /// 终态任务不再被调度
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    /// 未完成的任务（进程重启后需要恢复）
    pub fn is_unfinished(&self) -> bool {
        matches!(
            self,
            TaskStatus::Pending | TaskStatus::Processing | TaskStatus::Uploading
        )
    }
}

/// 转码产出的视频元数据
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub duration_ms: u64,
    pub size: u64,
}

/// 转码产物：HD/SD 两路渲染 + 缩略图的本地路径
///
/// 一旦写入任务记录就不会重新计算（重试时直接复用）。
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProcessedVideo {
    pub hd_path: PathBuf,
    pub sd_path: PathBuf,
    pub thumbnail_path: PathBuf,
    pub metadata: VideoMetadata,
}

impl ProcessedVideo {
    /// 转码产生的临时文件（不包含持久化的源文件）
    pub fn temp_files(&self) -> Vec<PathBuf> {
        vec![
            self.hd_path.clone(),
            self.sd_path.clone(),
            self.thumbnail_path.clone(),
        ]
    }
}

/// 预签名上传地址。key 是对象存储中的标识，finalize 步骤会引用它，
/// 因此一旦写入任务记录就不会重新申请。
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUrls {
    pub hd_url: String,
    pub hd_key: String,
    pub sd_url: String,
    pub sd_key: String,
    pub thumbnail_url: String,
    pub thumbnail_key: String,
}

/// 上传任务（持久化的工作单元）
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadTask {
    /// 任务 ID
    pub id: TaskId,
    /// 持久化副本的路径（绝不是相机缓存目录里的原始文件）
    pub video_file_path: PathBuf,
    /// 回复目标；None 表示新建 bondfire
    pub target_bondfire_id: Option<String>,
    /// 与 target_bondfire_id 冗余，保留显式字段
    pub is_response: bool,
    /// 当前状态
    pub status: TaskStatus,
    /// 已进行的尝试次数
    pub attempt_count: u32,
    /// 最近一次尝试的开始时间
    pub last_attempt_at: Option<DateTime<Utc>>,
    /// 转码结果缓存
    pub processed_video: Option<ProcessedVideo>,
    /// 预签名地址缓存
    pub presigned_urls: Option<PresignedUrls>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl UploadTask {
    pub fn new(video_file_path: PathBuf, target_bondfire_id: Option<String>) -> Self {
        let is_response = target_bondfire_id.is_some();
        Self {
            id: TaskId::new(),
            video_file_path,
            target_bondfire_id,
            is_response,
            status: TaskStatus::Pending,
            attempt_count: 0,
            last_attempt_at: None,
            processed_video: None,
            presigned_urls: None,
            created_at: Utc::now(),
        }
    }
}

/// 任务的部分更新（merge 语义：只有设置的字段会被写入）
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub status: Option<TaskStatus>,
    pub attempt_count: Option<u32>,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub processed_video: Option<ProcessedVideo>,
    pub presigned_urls: Option<PresignedUrls>,
}

impl TaskPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn attempt_count(mut self, count: u32) -> Self {
        self.attempt_count = Some(count);
        self
    }

    pub fn last_attempt_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_attempt_at = Some(at);
        self
    }

    pub fn processed_video(mut self, processed: ProcessedVideo) -> Self {
        self.processed_video = Some(processed);
        self
    }

    pub fn presigned_urls(mut self, urls: PresignedUrls) -> Self {
        self.presigned_urls = Some(urls);
        self
    }

    /// Apply the patch to a task record
    pub fn apply(self, task: &mut UploadTask) {
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(count) = self.attempt_count {
            task.attempt_count = count;
        }
        if let Some(at) = self.last_attempt_at {
            task.last_attempt_at = Some(at);
        }
        if let Some(processed) = self.processed_video {
            task.processed_video = Some(processed);
        }
        if let Some(urls) = self.presigned_urls {
            task.presigned_urls = Some(urls);
        }
    }
}

pub type ProgressFn = Arc<dyn Fn(u8, UploadStage) + Send + Sync>;
pub type CompleteFn = Arc<dyn Fn(TaskId) + Send + Sync>;
pub type ErrorFn = Arc<dyn Fn(TaskId, &UploadError) + Send + Sync>;

/// 回调集合。progress 在每个子步骤触发；complete/error 对一个任务
/// 各自最多触发一次（error 只在重试耗尽时触发，而不是每次失败）。
#[derive(Clone, Default)]
pub struct UploadCallbacks {
    pub on_progress: Option<ProgressFn>,
    pub on_complete: Option<CompleteFn>,
    pub on_error: Option<ErrorFn>,
}

impl UploadCallbacks {
    pub(crate) fn progress(&self, percent: u8, stage: UploadStage) {
        if let Some(callback) = &self.on_progress {
            callback(percent, stage);
        }
    }

    pub(crate) fn complete(&self, id: TaskId) {
        if let Some(callback) = &self.on_complete {
            callback(id);
        }
    }

    pub(crate) fn error(&self, id: TaskId, error: &UploadError) {
        if let Some(callback) = &self.on_error {
            callback(id, error);
        }
    }
}

impl std::fmt::Debug for UploadCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadCallbacks")
            .field("on_progress", &self.on_progress.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

// 静态断言确保类型是 Send 的
const _: () = {
    const fn assert_send<T: Send>() {}
    assert_send::<UploadTask>();
    assert_send::<TaskPatch>();
    assert_send::<UploadCallbacks>();
};
