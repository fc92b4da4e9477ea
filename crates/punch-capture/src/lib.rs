//! Live capture-and-submission pipeline.
//!
//! This crate provides:
//! - Frame sources (camera snapshot file, fixed image)
//! - A non-overlapping sampler driven by a timer
//! - The submission gate deciding which frames reach the backend
//! - Live scanner wiring and manual single-shot capture

pub mod backend;
pub mod config;
pub mod error;
pub mod gate;
pub mod live;
pub mod manual;
pub mod metrics;
pub mod sampler;
pub mod source;

pub use config::{KioskConfig, ScanConfig};
pub use error::{CaptureError, CaptureResult};
pub use gate::{Admission, GateEvent, SubmissionGate, Submitter};
pub use live::LiveScanner;
pub use manual::ManualCapture;
pub use sampler::{FrameHandler, HandlerSlot, Sampler};
pub use source::{FileFrameSource, FrameSource, StaticFrameSource};
