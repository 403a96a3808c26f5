use std::path::Path;
use std::time::Duration;
use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client};
use serde::Serialize;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use url::Url;
use crate::core::{
    NewBondfire, NewResponse, PresignedUrls, RecordFinalizer, Result, UploadError, UploadTransport,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadUrlRequest<'a> {
    filename: &'a str,
    content_type: &'a str,
}

/// 应用后端的 HTTP 客户端：申请预签名地址、PUT 渲染文件、
/// 创建 bondfire / response 记录。
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
    token: String,
}

impl BackendClient {
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(UploadError::Http)?;

        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
            token: token.into(),
        })
    }

    async fn post_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<reqwest::Response> {
        let endpoint = self.base_url.join(path)?;
        let response = self
            .client
            .post(endpoint)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        Ok(response)
    }
}

#[async_trait]
impl UploadTransport for BackendClient {
    async fn get_upload_urls(&self, filename: &str, content_type: &str) -> Result<PresignedUrls> {
        let request = UploadUrlRequest {
            filename,
            content_type,
        };
        let response = self.post_json("uploads/urls", &request).await?;

        if !response.status().is_success() {
            return Err(UploadError::UrlIssuance(format!(
                "status code {}",
                response.status()
            )));
        }

        let urls: PresignedUrls = response.json().await?;

        // 校验签发的地址可以解析
        for issued in [&urls.hd_url, &urls.sd_url, &urls.thumbnail_url] {
            Url::parse(issued)?;
        }

        Ok(urls)
    }

    async fn upload_blob(&self, url: &str, path: &Path, content_type: &str) -> Result<()> {
        let file = File::open(path).await?;
        let size = file.metadata().await?.len();
        let stream = ReaderStream::new(file);

        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, content_type)
            .header(CONTENT_LENGTH, size)
            .body(Body::wrap_stream(stream))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(UploadError::UploadFailed(response.status().as_u16()));
        }

        Ok(())
    }
}

#[async_trait]
impl RecordFinalizer for BackendClient {
    async fn create_bondfire(&self, record: NewBondfire) -> Result<()> {
        let response = self.post_json("bondfires", &record).await?;
        if !response.status().is_success() {
            return Err(UploadError::finalize_failed(format!(
                "create bondfire returned {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn add_response(&self, record: NewResponse) -> Result<()> {
        let path = format!("bondfires/{}/responses", record.bondfire_id);
        let response = self.post_json(&path, &record).await?;
        if !response.status().is_success() {
            return Err(UploadError::finalize_failed(format!(
                "add response returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}
