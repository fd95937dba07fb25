use crate::domain::model::{Issue, StoredIssue, Submission};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

pub trait BlobStore: Send + Sync {
    fn fetch(&self, reference: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

pub trait Transcriber: Send + Sync {
    fn transcribe(&self, audio: &Path) -> impl std::future::Future<Output = Result<String>> + Send;
    fn is_available(&self) -> impl std::future::Future<Output = bool> + Send;
}

pub trait FrameExtractor: Send + Sync {
    fn extract_first_frame(
        &self,
        input: &Path,
        output: &Path,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn is_available(&self) -> impl std::future::Future<Output = bool> + Send;
}

pub trait VisionModel: Send + Sync {
    fn generate(
        &self,
        prompt: &str,
        image: &[u8],
        mime_type: &str,
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

#[async_trait]
pub trait IssueStore: Send + Sync {
    async fn insert(&self, issue: &Issue) -> Result<StoredIssue>;
    async fn list_recent(&self, limit: usize) -> Result<Vec<StoredIssue>>;
}

/// The produced surface of the triage core. `process` is total: every
/// internal failure degrades to default category/priority instead of
/// surfacing.
#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn process(&self, submission: &Submission) -> Issue;
}
