// Adapters: concrete collaborators behind the domain ports.

pub mod blob;
pub mod frames;
pub mod speech;
pub mod store;
pub mod vision;

pub use blob::{LocalBlobStore, SupabaseBlobStore};
pub use frames::FfmpegFrameExtractor;
pub use speech::WhisperCliTranscriber;
pub use store::SupabaseIssueStore;
pub use vision::GeminiVisionClient;
