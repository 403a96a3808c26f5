use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use async_trait::async_trait;
use tracing::warn;
use uuid::Uuid;
use crate::core::{MediaFiles, Result, UploadError};

/// 本地文件管理：把源视频从相机缓存目录拷贝到持久目录，
/// 并负责转码临时文件的清理。
pub struct LocalMediaFiles {
    persistent_dir: PathBuf,
}

impl LocalMediaFiles {
    pub fn new(persistent_dir: impl Into<PathBuf>) -> Self {
        Self {
            persistent_dir: persistent_dir.into(),
        }
    }
}

#[async_trait]
impl MediaFiles for LocalMediaFiles {
    async fn copy_to_persistent(&self, source: &Path) -> Result<PathBuf> {
        match tokio::fs::metadata(source).await {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => return Err(UploadError::SourceNotFound(source.to_path_buf())),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(UploadError::SourceNotFound(source.to_path_buf()));
            }
            Err(err) => return Err(err.into()),
        }

        tokio::fs::create_dir_all(&self.persistent_dir).await?;

        let file_name = source
            .file_name()
            .ok_or_else(|| UploadError::SourceNotFound(source.to_path_buf()))?;
        // 源文件名可能重复，前缀一个随机 ID
        let destination = self
            .persistent_dir
            .join(format!("{}-{}", Uuid::new_v4(), file_name.to_string_lossy()));

        tokio::fs::copy(source, &destination).await?;
        Ok(destination)
    }

    async fn delete_temp_files(&self, paths: &[PathBuf]) {
        for path in paths {
            if let Err(err) = tokio::fs::remove_file(path).await {
                warn!(path = %path.display(), %err, "failed to delete temp rendition");
            }
        }
    }
}
