use serde::{Deserialize, Serialize};

/// 管线阶段，随进度回调一起上报
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStage {
    Processing,
    RequestingUrls,
    UploadingHd,
    UploadingSd,
    UploadingThumbnail,
    Finalizing,
    Done,
}

impl UploadStage {
    pub fn label(&self) -> &'static str {
        match self {
            UploadStage::Processing => "processing",
            UploadStage::RequestingUrls => "requesting upload urls",
            UploadStage::UploadingHd => "uploading hd",
            UploadStage::UploadingSd => "uploading sd",
            UploadStage::UploadingThumbnail => "uploading thumbnail",
            UploadStage::Finalizing => "finalizing",
            UploadStage::Done => "done",
        }
    }
}

impl std::fmt::Display for UploadStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// 各阶段在总进度中的占比：
// 转码 0-40，申请地址 40-50，HD 50-70，SD 70-85，缩略图 85-90，
// finalize 90，完成 100。
pub(crate) const PROCESSING_END: u8 = 40;
pub(crate) const URLS_END: u8 = 50;
pub(crate) const HD_END: u8 = 70;
pub(crate) const SD_END: u8 = 85;
pub(crate) const THUMBNAIL_END: u8 = 90;
pub(crate) const DONE: u8 = 100;

/// 转码器上报的 0.0..=1.0 比例映射到总进度的前 40%
pub fn processing_percent(fraction: f64) -> u8 {
    let fraction = fraction.clamp(0.0, 1.0);
    (fraction * f64::from(PROCESSING_END)).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_percent_spans_first_forty() {
        assert_eq!(processing_percent(0.0), 0);
        assert_eq!(processing_percent(0.5), 20);
        assert_eq!(processing_percent(1.0), 40);
    }

    #[test]
    fn test_processing_percent_clamps() {
        assert_eq!(processing_percent(-0.3), 0);
        assert_eq!(processing_percent(1.7), 40);
    }

    #[test]
    fn test_stage_labels() {
        assert_eq!(UploadStage::UploadingHd.to_string(), "uploading hd");
        assert_eq!(UploadStage::Done.label(), "done");
    }
}
