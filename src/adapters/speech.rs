use crate::domain::ports::Transcriber;
use crate::utils::error::{Result, TriageError};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

const DEFAULT_BINARY: &str = "whisper-cli";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// whisper.cpp 風格的命令列轉寫器。模型載入 + 推論都在外部行程裡,
/// 超時就砍掉,轉寫失敗不會往管線外傳。
pub struct WhisperCliTranscriber {
    binary: String,
    model_path: PathBuf,
    timeout: Duration,
}

impl WhisperCliTranscriber {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            binary: DEFAULT_BINARY.to_string(),
            model_path: model_path.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// 每次轉寫用獨一無二的輸出檔底名,避免並發投訴互踩。
    fn output_base(&self) -> PathBuf {
        std::env::temp_dir().join(format!(
            "transcript_{}_{}",
            std::process::id(),
            chrono::Utc::now().timestamp_micros()
        ))
    }
}

impl Transcriber for WhisperCliTranscriber {
    async fn transcribe(&self, audio: &Path) -> Result<String> {
        let base = self.output_base();
        let transcript_path = PathBuf::from(format!("{}.txt", base.display()));

        // <bin> -m <model> -f <audio> -otxt -of <base> -np
        let mut child = Command::new(&self.binary)
            .arg("-m")
            .arg(&self.model_path)
            .arg("-f")
            .arg(audio)
            .arg("-otxt")
            .arg("-of")
            .arg(&base)
            .arg("-np")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                TriageError::ExtractionError(format!("could not launch {}: {}", self.binary, e))
            })?;

        // 超時或等待失敗時,半寫完的 <base>.txt 也要清掉
        let status = match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                let _ = tokio::fs::remove_file(&transcript_path).await;
                return Err(TriageError::ExtractionError(e.to_string()));
            }
            Err(_) => {
                let _ = tokio::fs::remove_file(&transcript_path).await;
                return Err(TriageError::ExtractionError(format!(
                    "transcription timed out after {:?}",
                    self.timeout
                )));
            }
        };

        if !status.success() {
            let _ = tokio::fs::remove_file(&transcript_path).await;
            return Err(TriageError::ExtractionError(format!(
                "{} exited with {}",
                self.binary, status
            )));
        }

        let text = tokio::fs::read_to_string(&transcript_path).await.map_err(|_| {
            TriageError::ExtractionError(format!(
                "transcript file {} was not produced",
                transcript_path.display()
            ))
        })?;
        let _ = tokio::fs::remove_file(&transcript_path).await;

        Ok(text)
    }

    async fn is_available(&self) -> bool {
        if !self.model_path.exists() {
            return false;
        }
        Command::new(&self.binary)
            .arg("--help")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .is_ok()
    }
}
