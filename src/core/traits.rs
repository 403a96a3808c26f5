use std::path::{Path, PathBuf};
use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use super::errors::Result;
use super::types::{PresignedUrls, ProcessedVideo};

/// 转码阶段的进度回调（0.0..=1.0）
pub type ProcessProgressFn = Arc<dyn Fn(f64) + Send + Sync>;

/// 视频转码引擎的边界。实际实现由外部的原生媒体库提供，
/// 这里只消费它的异步结果和进度回调。
#[async_trait]
pub trait VideoProcessor: Send + Sync {
    /// 把一个输入文件转码成 HD/SD 两路渲染 + 缩略图
    async fn process_video(
        &self,
        input: &Path,
        on_progress: ProcessProgressFn,
    ) -> Result<ProcessedVideo>;
}

/// 对象存储传输边界：申请预签名地址 + 按地址 PUT 文件
#[async_trait]
pub trait UploadTransport: Send + Sync {
    async fn get_upload_urls(&self, filename: &str, content_type: &str) -> Result<PresignedUrls>;

    /// 把本地文件作为原始二进制 body PUT 到预签名地址
    async fn upload_blob(&self, url: &str, path: &Path, content_type: &str) -> Result<()>;
}

/// 新建 bondfire 的记录内容
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBondfire {
    pub video_key: String,
    pub sd_video_key: String,
    pub thumbnail_key: String,
    pub duration_ms: u64,
    pub width: u32,
    pub height: u32,
}

/// 给已有 bondfire 追加回复的记录内容
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResponse {
    pub bondfire_id: String,
    pub video_key: String,
    pub sd_video_key: String,
    pub thumbnail_key: String,
    pub duration_ms: u64,
    pub width: u32,
    pub height: u32,
}

/// 远端记录的创建边界（bondfire / response 二选一）
#[async_trait]
pub trait RecordFinalizer: Send + Sync {
    async fn create_bondfire(&self, record: NewBondfire) -> Result<()>;

    async fn add_response(&self, record: NewResponse) -> Result<()>;
}

/// 本地文件管理边界：把源文件拷贝出缓存目录、清理转码临时文件
#[async_trait]
pub trait MediaFiles: Send + Sync {
    /// 把源文件拷贝到持久目录，返回持久副本的路径。
    /// 源文件不存在时返回 `SourceNotFound`。
    async fn copy_to_persistent(&self, source: &Path) -> Result<PathBuf>;

    /// Best effort, errors are logged and swallowed
    async fn delete_temp_files(&self, paths: &[PathBuf]);
}

/// 一次上传需要的全部外部协作方。这些绑定依附当前进程的会话，
/// 无法持久化，恢复任务时必须重新注入。
#[derive(Clone)]
pub struct Collaborators {
    pub files: Arc<dyn MediaFiles>,
    pub processor: Arc<dyn VideoProcessor>,
    pub transport: Arc<dyn UploadTransport>,
    pub finalizer: Arc<dyn RecordFinalizer>,
}
