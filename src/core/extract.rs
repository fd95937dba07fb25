use crate::domain::model::Modality;
use crate::domain::ports::{FrameExtractor, Transcriber};
use std::path::{Path, PathBuf};
use tempfile::TempPath;

/// 管線下游實際分類的內容：文字稿或靜態影像。
#[derive(Debug)]
pub enum Artifact {
    Text(String),
    Image(ImageSource),
}

/// 影像來源。從影片抽出的畫格持有自己的暫存路徑，
/// 離開作用域時自動刪除。
#[derive(Debug)]
pub enum ImageSource {
    Stored(PathBuf),
    Extracted(TempPath),
}

impl ImageSource {
    pub fn path(&self) -> &Path {
        match self {
            ImageSource::Stored(path) => path,
            ImageSource::Extracted(temp) => temp,
        }
    }
}

/// 依模態從已下載的媒體檔案抽取可分類的內容。
/// 所有失敗都轉成 None 並留下記錄，不會往上拋。
pub struct ArtifactExtractor<T: Transcriber, F: FrameExtractor> {
    transcriber: T,
    frames: F,
}

impl<T: Transcriber, F: FrameExtractor> ArtifactExtractor<T, F> {
    pub fn new(transcriber: T, frames: F) -> Self {
        Self {
            transcriber,
            frames,
        }
    }

    pub async fn extract(&self, modality: Modality, media: &Path) -> Option<Artifact> {
        match modality {
            Modality::Image => Some(Artifact::Image(ImageSource::Stored(media.to_path_buf()))),
            Modality::Audio => self.transcribe_audio(media).await,
            Modality::Video => self.extract_video_frame(media).await,
            Modality::Unsupported => {
                tracing::debug!("Unsupported modality, nothing to extract");
                None
            }
        }
    }

    /// 語音轉文字。失敗時回傳 None，讓管線保留原始描述。
    async fn transcribe_audio(&self, audio: &Path) -> Option<Artifact> {
        match self.transcriber.transcribe(audio).await {
            Ok(raw) => {
                let transcript = raw.trim().to_string();
                tracing::info!("🔄 Transcribed {} chars of audio", transcript.len());
                Some(Artifact::Text(transcript))
            }
            Err(e) => {
                tracing::warn!("⚠️ Audio transcription failed: {}", e);
                None
            }
        }
    }

    /// 影片抽取單一畫格。先建立帶 .jpg 後綴的暫存檔，
    /// 由外部轉碼器覆寫；失敗時暫存檔隨 TempPath 一併清掉。
    async fn extract_video_frame(&self, video: &Path) -> Option<Artifact> {
        let placeholder = match tempfile::Builder::new()
            .prefix("frame_")
            .suffix(".jpg")
            .tempfile()
        {
            Ok(file) => file.into_temp_path(),
            Err(e) => {
                tracing::warn!("⚠️ Could not allocate frame temp file: {}", e);
                return None;
            }
        };

        match self.frames.extract_first_frame(video, &placeholder).await {
            Ok(()) => {
                tracing::info!("🔄 Extracted first frame to {}", placeholder.display());
                Some(Artifact::Image(ImageSource::Extracted(placeholder)))
            }
            Err(e) => {
                tracing::warn!("⚠️ Frame extraction failed: {}", e);
                None
            }
        }
    }
}
