pub mod backend;
pub mod config;
pub mod core;
pub mod utils;

// 重新导出核心类型
pub use self::core::{
    Collaborators,
    JsonTaskStore,
    MediaFiles,
    MemoryTaskStore,
    NewBondfire,
    NewResponse,
    PresignedUrls,
    ProcessProgressFn,
    ProcessedVideo,
    RecordFinalizer,
    Result,
    ResumeOptions,
    StartUploadOptions,
    TaskId,
    TaskPatch,
    TaskStatus,
    TaskStore,
    UploadCallbacks,
    UploadError,
    UploadManager,
    UploadStage,
    UploadTask,
    UploadTransport,
    VideoMetadata,
    VideoProcessor,
};

pub use backend::{BackendClient, LocalMediaFiles};
pub use config::UploadConfig;
