use crate::core::classify::CategoryClassifier;
use crate::core::extract::{Artifact, ArtifactExtractor};
use crate::core::modality;
use crate::domain::model::{Category, Issue, Modality, Submission};
use crate::domain::ports::{BlobStore, FrameExtractor, Pipeline, Transcriber, VisionModel};

/// 管線各階段提煉出的增補內容。沒有增補時維持預設值。
enum Enrichment {
    Transcript(String),
    Classified(Category),
}

/// 媒體分類管線:抓取附件、判斷模態、抽取可分類內容、
/// 呼叫視覺模型,最後組出完整的 Issue。
///
/// `process` 是全函數:任何階段失敗都降級回預設的
/// category=other / priority=low,絕不拒絕投訴。
pub struct MediaTriagePipeline<B, T, F, V>
where
    B: BlobStore,
    T: Transcriber,
    F: FrameExtractor,
    V: VisionModel,
{
    blob: B,
    extractor: ArtifactExtractor<T, F>,
    classifier: CategoryClassifier<V>,
}

impl<B, T, F, V> MediaTriagePipeline<B, T, F, V>
where
    B: BlobStore,
    T: Transcriber,
    F: FrameExtractor,
    V: VisionModel,
{
    pub fn new(blob: B, transcriber: T, frames: F, vision: V) -> Self {
        Self {
            blob,
            extractor: ArtifactExtractor::new(transcriber, frames),
            classifier: CategoryClassifier::new(vision),
        }
    }

    /// 抓檔、判模態、抽內容、分類。回傳 None 表示「沒有任何增補」,
    /// 管線保持預設值。媒體暫存檔在離開這個函數時一定被刪除。
    async fn enrich(&self, reference: &str) -> Option<Enrichment> {
        let bytes = match self.blob.fetch(reference).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("⚠️ Blob fetch failed for '{}': {}", reference, e);
                return None;
            }
        };
        tracing::debug!("Fetched {} bytes for '{}'", bytes.len(), reference);

        // 暫存檔帶原始副檔名,讓外部工具(ffmpeg/whisper)認得格式
        let suffix = modality::extension_of(reference)
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();
        let media = match tempfile::Builder::new()
            .prefix("media_")
            .suffix(&suffix)
            .tempfile()
        {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!("⚠️ Could not allocate media temp file: {}", e);
                return None;
            }
        };
        if let Err(e) = tokio::fs::write(media.path(), &bytes).await {
            tracing::warn!("⚠️ Could not write media temp file: {}", e);
            return None;
        }

        let detected = modality::detect(reference);
        if detected == Modality::Unsupported {
            tracing::debug!("Unsupported media '{}', keeping defaults", reference);
            return None;
        }

        let artifact = self.extractor.extract(detected, media.path()).await?;
        match artifact {
            Artifact::Text(text) => Some(Enrichment::Transcript(text)),
            Artifact::Image(source) => {
                let category = self.classifier.classify(source.path()).await;
                Some(Enrichment::Classified(category))
            }
        }
    }
}

#[async_trait::async_trait]
impl<B, T, F, V> Pipeline for MediaTriagePipeline<B, T, F, V>
where
    B: BlobStore,
    T: Transcriber,
    F: FrameExtractor,
    V: VisionModel,
{
    async fn process(&self, submission: &Submission) -> Issue {
        let mut description = submission.description.clone();
        let mut category = Category::Other;

        if let Some(reference) = &submission.file_reference {
            match self.enrich(reference).await {
                // 空的文字稿不取代原始描述
                Some(Enrichment::Transcript(text)) if !text.is_empty() => {
                    tracing::info!("📝 Description replaced by transcript");
                    description = text;
                }
                Some(Enrichment::Classified(label)) => {
                    category = label;
                }
                _ => {}
            }
        }

        Issue::assemble(submission, description, category, category.priority())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Priority;
    use crate::utils::error::{Result, TriageError};
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct MockBlob {
        bytes: Option<Vec<u8>>,
        calls: Arc<AtomicUsize>,
    }

    impl MockBlob {
        fn serving(bytes: &[u8]) -> Self {
            Self {
                bytes: Some(bytes.to_vec()),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn failing() -> Self {
            Self {
                bytes: None,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl BlobStore for MockBlob {
        async fn fetch(&self, reference: &str) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.bytes
                .clone()
                .ok_or_else(|| TriageError::FetchError(format!("no object for '{}'", reference)))
        }
    }

    struct MockTranscriber(Option<String>);

    impl Transcriber for MockTranscriber {
        async fn transcribe(&self, _audio: &Path) -> Result<String> {
            self.0
                .clone()
                .ok_or_else(|| TriageError::ExtractionError("transcription failed".into()))
        }

        async fn is_available(&self) -> bool {
            true
        }
    }

    struct MockFrames {
        succeed: bool,
        seen_output: Arc<Mutex<Option<PathBuf>>>,
    }

    impl FrameExtractor for MockFrames {
        async fn extract_first_frame(&self, _input: &Path, output: &Path) -> Result<()> {
            *self.seen_output.lock().unwrap() = Some(output.to_path_buf());
            if self.succeed {
                std::fs::write(output, b"frame").unwrap();
                Ok(())
            } else {
                Err(TriageError::ExtractionError("exit code 1".into()))
            }
        }

        async fn is_available(&self) -> bool {
            true
        }
    }

    struct MockVision {
        answer: Option<String>,
        seen_image: Arc<Mutex<Option<Vec<u8>>>>,
    }

    impl VisionModel for MockVision {
        async fn generate(&self, _prompt: &str, image: &[u8], _mime: &str) -> Result<String> {
            *self.seen_image.lock().unwrap() = Some(image.to_vec());
            self.answer
                .clone()
                .ok_or_else(|| TriageError::ClassificationError("model down".into()))
        }
    }

    fn submission(description: &str, file_reference: Option<&str>) -> Submission {
        Submission {
            description: description.to_string(),
            reporter_id: "citizen-1".to_string(),
            lat: 25.03,
            lng: 121.52,
            file_reference: file_reference.map(|s| s.to_string()),
        }
    }

    fn pipeline(
        blob: MockBlob,
        transcript: Option<&str>,
        frames_succeed: bool,
        answer: Option<&str>,
    ) -> MediaTriagePipeline<MockBlob, MockTranscriber, MockFrames, MockVision> {
        MediaTriagePipeline::new(
            blob,
            MockTranscriber(transcript.map(|s| s.to_string())),
            MockFrames {
                succeed: frames_succeed,
                seen_output: Arc::new(Mutex::new(None)),
            },
            MockVision {
                answer: answer.map(|s| s.to_string()),
                seen_image: Arc::new(Mutex::new(None)),
            },
        )
    }

    #[tokio::test]
    async fn test_no_file_reference_keeps_defaults_without_collaborator_calls() {
        let blob = MockBlob::serving(b"unused");
        let calls = blob.calls.clone();
        let pipeline = pipeline(blob, None, true, None);

        let issue = pipeline
            .process(&submission("graffiti on the underpass", None))
            .await;

        assert_eq!(issue.category, Category::Other);
        assert_eq!(issue.priority, Priority::Low);
        assert_eq!(issue.description, "graffiti on the underpass");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_image_submission_is_classified() {
        let pipeline = pipeline(MockBlob::serving(b"jpeg bytes"), None, true, Some("Garbage"));

        let issue = pipeline
            .process(&submission("trash everywhere", Some("report.jpg")))
            .await;

        assert_eq!(issue.category, Category::Garbage);
        assert_eq!(issue.priority, Priority::High);
        assert_eq!(issue.status, "pending");
    }

    #[tokio::test]
    async fn test_classifier_sees_fetched_image_bytes() {
        let blob = MockBlob::serving(b"jpeg payload");
        let vision = MockVision {
            answer: Some("pothole".to_string()),
            seen_image: Arc::new(Mutex::new(None)),
        };
        let seen = vision.seen_image.clone();
        let pipeline = MediaTriagePipeline::new(
            blob,
            MockTranscriber(None),
            MockFrames {
                succeed: true,
                seen_output: Arc::new(Mutex::new(None)),
            },
            vision,
        );

        pipeline
            .process(&submission("hole in the road", Some("report.jpg")))
            .await;

        assert_eq!(seen.lock().unwrap().as_deref(), Some(&b"jpeg payload"[..]));
    }

    #[tokio::test]
    async fn test_transcript_replaces_empty_description() {
        let pipeline = pipeline(
            MockBlob::serving(b"audio bytes"),
            Some(" there is a broken streetlight on Main St \n"),
            true,
            None,
        );

        let issue = pipeline.process(&submission("", Some("voice.mp3"))).await;

        assert_eq!(issue.description, "there is a broken streetlight on Main St");
        assert_eq!(issue.category, Category::Other);
        assert_eq!(issue.priority, Priority::Low);
    }

    #[tokio::test]
    async fn test_empty_transcript_keeps_original_description() {
        let pipeline = pipeline(MockBlob::serving(b"audio bytes"), Some("   "), true, None);

        let issue = pipeline
            .process(&submission("noisy drain cover", Some("voice.wav")))
            .await;

        assert_eq!(issue.description, "noisy drain cover");
    }

    #[tokio::test]
    async fn test_failed_frame_extraction_degrades_and_leaves_no_frame_file() {
        let blob = MockBlob::serving(b"video bytes");
        let frames = MockFrames {
            succeed: false,
            seen_output: Arc::new(Mutex::new(None)),
        };
        let seen = frames.seen_output.clone();
        let pipeline = MediaTriagePipeline::new(
            blob,
            MockTranscriber(None),
            frames,
            MockVision {
                answer: Some("pothole".to_string()),
                seen_image: Arc::new(Mutex::new(None)),
            },
        );

        let issue = pipeline
            .process(&submission("cars swerving", Some("clip.mp4")))
            .await;

        assert_eq!(issue.category, Category::Other);
        assert_eq!(issue.priority, Priority::Low);
        assert_eq!(issue.description, "cars swerving");
        let frame_path = seen.lock().unwrap().clone().unwrap();
        assert!(!frame_path.exists());
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_defaults() {
        let pipeline = pipeline(MockBlob::failing(), None, true, Some("garbage"));

        let issue = pipeline
            .process(&submission("overflowing bin", Some("report.jpg")))
            .await;

        assert_eq!(issue.category, Category::Other);
        assert_eq!(issue.description, "overflowing bin");
    }

    #[tokio::test]
    async fn test_unsupported_extension_keeps_defaults() {
        let pipeline = pipeline(MockBlob::serving(b"%PDF-1.4"), None, true, Some("garbage"));

        let issue = pipeline
            .process(&submission("see attachment", Some("doc.pdf")))
            .await;

        assert_eq!(issue.category, Category::Other);
        assert_eq!(issue.priority, Priority::Low);
    }
}
