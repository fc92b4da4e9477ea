//! Frame sources.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use punch_models::Frame;
use tracing::debug;

/// On-demand still-frame extraction from a camera feed.
///
/// `None` means the device has no frame ready yet. Callers retry on their next
/// tick; it is never an error. Capturing does not consume or advance anything,
/// so repeated calls are harmless.
#[async_trait]
pub trait FrameSource: Send + Sync + 'static {
    async fn capture_frame(&self) -> Option<Frame>;
}

#[async_trait]
impl<T: FrameSource + ?Sized> FrameSource for Arc<T> {
    async fn capture_frame(&self) -> Option<Frame> {
        (**self).capture_frame().await
    }
}

/// Reads the still image a camera daemon keeps current on disk.
#[derive(Debug, Clone)]
pub struct FileFrameSource {
    path: PathBuf,
    content_type: &'static str,
}

impl FileFrameSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let content_type = content_type_for(&path);
        Self { path, content_type }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl FrameSource for FileFrameSource {
    async fn capture_frame(&self) -> Option<Frame> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => {
                debug!(path = %self.path.display(), "Frame file is empty");
                None
            }
            Ok(bytes) => Some(Frame::new(bytes, self.content_type)),
            Err(e) => {
                debug!(path = %self.path.display(), "Frame not ready: {}", e);
                None
            }
        }
    }
}

/// Always yields the same frame, or nothing.
#[derive(Debug, Clone, Default)]
pub struct StaticFrameSource {
    frame: Option<Frame>,
}

impl StaticFrameSource {
    pub fn ready(frame: Frame) -> Self {
        Self { frame: Some(frame) }
    }

    pub fn not_ready() -> Self {
        Self { frame: None }
    }
}

#[async_trait]
impl FrameSource for StaticFrameSource {
    async fn capture_frame(&self) -> Option<Frame> {
        self.frame.clone()
    }
}

fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => punch_models::frame::JPEG,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_source_missing_file_is_not_ready() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileFrameSource::new(dir.path().join("frame.jpg"));
        assert!(source.capture_frame().await.is_none());
    }

    #[tokio::test]
    async fn test_file_source_empty_file_is_not_ready() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.jpg");
        std::fs::write(&path, b"").unwrap();
        assert!(FileFrameSource::new(&path).capture_frame().await.is_none());
    }

    #[tokio::test]
    async fn test_file_source_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.PNG");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let source = FileFrameSource::new(&path);
        let first = source.capture_frame().await.unwrap();
        let second = source.capture_frame().await.unwrap();
        assert_eq!(first.data(), second.data());
        assert_eq!(first.content_type(), "image/png");
    }

    #[tokio::test]
    async fn test_static_source() {
        assert!(StaticFrameSource::not_ready().capture_frame().await.is_none());
        let frame = Frame::jpeg(vec![1, 2, 3]);
        let source = StaticFrameSource::ready(frame.clone());
        assert_eq!(source.capture_frame().await.unwrap(), frame);
    }
}
