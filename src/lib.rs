pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::TriageConfig;

pub use crate::adapters::{
    FfmpegFrameExtractor, GeminiVisionClient, LocalBlobStore, SupabaseBlobStore,
    SupabaseIssueStore, WhisperCliTranscriber,
};
pub use crate::core::{engine::TriageEngine, pipeline::MediaTriagePipeline};
pub use crate::domain::model::{Category, Issue, Modality, Priority, StoredIssue, Submission};
pub use crate::domain::ports::{
    BlobStore, FrameExtractor, IssueStore, Pipeline, Transcriber, VisionModel,
};
pub use crate::utils::error::{Result, TriageError};
