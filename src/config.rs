use std::path::Path;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::core::Result;

// Duration 以毫秒数序列化
fn serialize_millis<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}

fn deserialize_millis<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let millis = u64::deserialize(deserializer)?;
    Ok(Duration::from_millis(millis))
}

/// 上传管线配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// 最大尝试次数（含第一次）
    pub max_retries: u32,
    /// 退避基准延迟；第 n 次尝试前等待 base * 2^(n-2)
    #[serde(
        rename = "base_retry_delay_ms",
        serialize_with = "serialize_millis",
        deserialize_with = "deserialize_millis"
    )]
    pub base_retry_delay: Duration,
    /// 完成后保留任务记录的宽限期
    #[serde(
        rename = "completed_task_grace_ms",
        serialize_with = "serialize_millis",
        deserialize_with = "deserialize_millis"
    )]
    pub completed_task_grace: Duration,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_retry_delay: Duration::from_millis(2000),
            completed_task_grace: Duration::from_secs(5),
        }
    }
}

impl UploadConfig {
    /// 从 TOML 文件加载配置
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = tokio::fs::read_to_string(path).await?;
        Ok(toml::from_str(&data)?)
    }
}
