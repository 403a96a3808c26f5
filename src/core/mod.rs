mod errors;
mod manager;
mod orchestrator;
mod progress;
mod store;
mod traits;
mod types;

pub use errors::{Result, UploadError};
pub use manager::{ResumeOptions, StartUploadOptions, UploadManager};
pub use progress::{processing_percent, UploadStage};
pub use store::{JsonTaskStore, MemoryTaskStore, TaskStore};
pub use traits::{
    Collaborators, MediaFiles, NewBondfire, NewResponse, ProcessProgressFn, RecordFinalizer,
    UploadTransport, VideoProcessor,
};
pub use types::{
    CompleteFn, ErrorFn, PresignedUrls, ProcessedVideo, ProgressFn, TaskId, TaskPatch, TaskStatus,
    UploadCallbacks, UploadTask, VideoMetadata, THUMBNAIL_CONTENT_TYPE, VIDEO_CONTENT_TYPE,
};
