//! Captured still frames.

use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, Utc};

/// Default MIME type of captured stills.
pub const JPEG: &str = "image/jpeg";

/// One encoded still image taken from the camera feed.
///
/// Frames are immutable and cheap to clone (the payload is reference counted),
/// so the sampler can hand one to the gate without copying image data.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    data: Bytes,
    content_type: String,
    captured_at: DateTime<Utc>,
}

impl Frame {
    /// Create a JPEG frame stamped with the current time.
    pub fn jpeg(data: impl Into<Bytes>) -> Self {
        Self::new(data, JPEG)
    }

    /// Create a frame with an explicit content type, stamped with the current time.
    pub fn new(data: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            content_type: content_type.into(),
            captured_at: Utc::now(),
        }
    }

    /// Override the capture timestamp.
    pub fn with_captured_at(mut self, captured_at: DateTime<Utc>) -> Self {
        self.captured_at = captured_at;
        self
    }

    /// Encoded image bytes.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// File name used for the multipart `file` part.
    pub fn file_name(&self) -> &'static str {
        match self.content_type.as_str() {
            "image/png" => "capture.png",
            "image/webp" => "capture.webp",
            _ => "capture.jpg",
        }
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("bytes", &self.data.len())
            .field("content_type", &self.content_type)
            .field("captured_at", &self.captured_at)
            .finish()
    }
}
