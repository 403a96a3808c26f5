use std::sync::Arc;
use chrono::Utc;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use crate::config::UploadConfig;
use crate::utils::RetryPolicy;
use super::errors::{Result, UploadError};
use super::progress::{self, UploadStage};
use super::store::TaskStore;
use super::traits::{Collaborators, NewBondfire, NewResponse, ProcessProgressFn};
use super::types::{
    PresignedUrls, ProcessedVideo, TaskId, TaskPatch, TaskStatus, UploadCallbacks, UploadTask,
    THUMBNAIL_CONTENT_TYPE, VIDEO_CONTENT_TYPE,
};

/// 驱动单个任务所需的全部依赖
#[derive(Clone)]
pub(crate) struct TaskContext {
    pub store: Arc<dyn TaskStore>,
    pub collaborators: Collaborators,
    pub callbacks: UploadCallbacks,
    pub config: UploadConfig,
}

/// 把一个任务驱动到终态：每次尝试跑完整个步骤序列，
/// 失败则退避后重新进入（缓存字段保证已完成的步骤被跳过）。
pub(crate) async fn drive_task(ctx: TaskContext, id: TaskId) {
    let policy = RetryPolicy::new(ctx.config.base_retry_delay, ctx.config.max_retries);

    loop {
        let task = match ctx.store.get_task(id).await {
            Ok(Some(task)) => task,
            Ok(None) => {
                debug!(task = %id, "task no longer in store, dropping driver");
                return;
            }
            Err(err) => {
                warn!(task = %id, %err, "failed to load task, dropping driver");
                return;
            }
        };

        // 已经有别的驱动把它送到终态
        if task.status.is_terminal() {
            return;
        }

        // 尝试次数在每次尝试开始时就已落库，崩溃中断的尝试视为已消耗。
        // 在最后一次尝试中途崩溃的任务恢复后直接进入 failed，不再给第六次。
        if policy.is_exhausted(task.attempt_count) {
            warn!(task = %id, attempts = task.attempt_count, "attempts already exhausted, marking task failed");
            if let Err(store_err) = ctx
                .store
                .update_task(id, TaskPatch::new().status(TaskStatus::Failed))
                .await
            {
                warn!(task = %id, %store_err, "failed to persist failed status");
            }
            ctx.callbacks.error(
                id,
                &UploadError::internal("retry attempts exhausted before completion"),
            );
            return;
        }

        let attempt = task.attempt_count + 1;
        let begin = TaskPatch::new()
            .status(TaskStatus::Processing)
            .attempt_count(attempt)
            .last_attempt_at(Utc::now());
        if let Err(err) = ctx.store.update_task(id, begin).await {
            warn!(task = %id, %err, "failed to persist attempt start");
            return;
        }

        debug!(task = %id, attempt, "starting upload attempt");
        match run_attempt(&ctx, id).await {
            Ok(()) => {
                complete_task(&ctx, id).await;
                return;
            }
            Err(err) if policy.is_exhausted(attempt) => {
                warn!(task = %id, attempt, %err, "retries exhausted, marking task failed");
                if let Err(store_err) = ctx
                    .store
                    .update_task(id, TaskPatch::new().status(TaskStatus::Failed))
                    .await
                {
                    warn!(task = %id, %store_err, "failed to persist failed status");
                }
                ctx.callbacks.error(id, &err);
                return;
            }
            Err(err) => {
                let delay = policy.delay_before(attempt + 1);
                debug!(task = %id, attempt, %err, delay_ms = delay.as_millis() as u64, "attempt failed, retrying after backoff");
                if let Err(store_err) = ctx
                    .store
                    .update_task(id, TaskPatch::new().status(TaskStatus::Pending))
                    .await
                {
                    warn!(task = %id, %store_err, "failed to persist pending status");
                    return;
                }
                sleep(delay).await;
            }
        }
    }
}

/// 一次完整的尝试：转码 → 申请地址 → 上传三个文件 → finalize → 清理。
/// 每步的产出先落库再继续，重试时已落库的步骤直接复用。
async fn run_attempt(ctx: &TaskContext, id: TaskId) -> Result<()> {
    let task = ctx
        .store
        .get_task(id)
        .await?
        .ok_or_else(|| UploadError::internal("task disappeared mid-attempt"))?;

    let processed = process_step(ctx, &task).await?;
    let urls = urls_step(ctx, &task).await?;
    upload_step(ctx, id, &processed, &urls).await?;
    finalize_step(ctx, &task, &processed, &urls).await?;

    // 清理转码临时文件，不删持久化的源文件。失败只记日志。
    ctx.collaborators
        .files
        .delete_temp_files(&processed.temp_files())
        .await;

    Ok(())
}

async fn process_step(ctx: &TaskContext, task: &UploadTask) -> Result<ProcessedVideo> {
    if let Some(processed) = &task.processed_video {
        debug!(task = %task.id, "processed renditions cached, skipping transcode");
        return Ok(processed.clone());
    }

    let callbacks = ctx.callbacks.clone();
    let on_progress: ProcessProgressFn = Arc::new(move |fraction| {
        callbacks.progress(progress::processing_percent(fraction), UploadStage::Processing);
    });

    let processed = ctx
        .collaborators
        .processor
        .process_video(&task.video_file_path, on_progress)
        .await?;

    ctx.store
        .update_task(task.id, TaskPatch::new().processed_video(processed.clone()))
        .await?;
    ctx.callbacks
        .progress(progress::PROCESSING_END, UploadStage::Processing);

    Ok(processed)
}

async fn urls_step(ctx: &TaskContext, task: &UploadTask) -> Result<PresignedUrls> {
    if let Some(urls) = &task.presigned_urls {
        // 缓存的 key 是 finalize 要引用的标识，绝不重新申请
        debug!(task = %task.id, "presigned urls cached, skipping issuance");
        return Ok(urls.clone());
    }

    ctx.callbacks
        .progress(progress::PROCESSING_END, UploadStage::RequestingUrls);

    let filename = format!("{}.mp4", task.id);
    let urls = ctx
        .collaborators
        .transport
        .get_upload_urls(&filename, VIDEO_CONTENT_TYPE)
        .await?;

    ctx.store
        .update_task(task.id, TaskPatch::new().presigned_urls(urls.clone()))
        .await?;

    Ok(urls)
}

async fn upload_step(
    ctx: &TaskContext,
    id: TaskId,
    processed: &ProcessedVideo,
    urls: &PresignedUrls,
) -> Result<()> {
    ctx.store
        .update_task(id, TaskPatch::new().status(TaskStatus::Uploading))
        .await?;

    let transport = &ctx.collaborators.transport;

    ctx.callbacks
        .progress(progress::URLS_END, UploadStage::UploadingHd);
    transport
        .upload_blob(&urls.hd_url, &processed.hd_path, VIDEO_CONTENT_TYPE)
        .await?;

    ctx.callbacks
        .progress(progress::HD_END, UploadStage::UploadingSd);
    transport
        .upload_blob(&urls.sd_url, &processed.sd_path, VIDEO_CONTENT_TYPE)
        .await?;

    ctx.callbacks
        .progress(progress::SD_END, UploadStage::UploadingThumbnail);
    transport
        .upload_blob(
            &urls.thumbnail_url,
            &processed.thumbnail_path,
            THUMBNAIL_CONTENT_TYPE,
        )
        .await?;

    Ok(())
}

async fn finalize_step(
    ctx: &TaskContext,
    task: &UploadTask,
    processed: &ProcessedVideo,
    urls: &PresignedUrls,
) -> Result<()> {
    ctx.callbacks
        .progress(progress::THUMBNAIL_END, UploadStage::Finalizing);

    let metadata = &processed.metadata;
    match &task.target_bondfire_id {
        Some(bondfire_id) => {
            ctx.collaborators
                .finalizer
                .add_response(NewResponse {
                    bondfire_id: bondfire_id.clone(),
                    video_key: urls.hd_key.clone(),
                    sd_video_key: urls.sd_key.clone(),
                    thumbnail_key: urls.thumbnail_key.clone(),
                    duration_ms: metadata.duration_ms,
                    width: metadata.width,
                    height: metadata.height,
                })
                .await
        }
        None => {
            ctx.collaborators
                .finalizer
                .create_bondfire(NewBondfire {
                    video_key: urls.hd_key.clone(),
                    sd_video_key: urls.sd_key.clone(),
                    thumbnail_key: urls.thumbnail_key.clone(),
                    duration_ms: metadata.duration_ms,
                    width: metadata.width,
                    height: metadata.height,
                })
                .await
        }
    }
}

/// 标记完成并在宽限期后移除任务记录。宽限期让 UI 有机会
/// 展示最终的完成状态，任务才从存储里消失。
async fn complete_task(ctx: &TaskContext, id: TaskId) {
    if let Err(err) = ctx
        .store
        .update_task(id, TaskPatch::new().status(TaskStatus::Completed))
        .await
    {
        warn!(task = %id, %err, "failed to persist completed status");
    }

    info!(task = %id, "upload completed");
    ctx.callbacks.progress(progress::DONE, UploadStage::Done);
    ctx.callbacks.complete(id);

    let store = ctx.store.clone();
    let grace = ctx.config.completed_task_grace;
    tokio::spawn(async move {
        sleep(grace).await;
        if let Err(err) = store.remove_task(id).await {
            warn!(task = %id, %err, "failed to remove completed task");
        }
    });
}
