use crate::domain::ports::FrameExtractor;
use crate::utils::error::{Result, TriageError};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

const DEFAULT_BINARY: &str = "ffmpeg";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// 用 ffmpeg 抽影片的第一個可解碼畫格。宣告成功前要過三關:
/// 結束碼為零、輸出檔存在、輸出檔非空。
pub struct FfmpegFrameExtractor {
    binary: String,
    timeout: Duration,
}

impl FfmpegFrameExtractor {
    pub fn new() -> Self {
        Self::with_binary(DEFAULT_BINARY)
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for FfmpegFrameExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameExtractor for FfmpegFrameExtractor {
    async fn extract_first_frame(&self, input: &Path, output: &Path) -> Result<()> {
        // <bin> -y -i <input> -frames:v 1 -q:v 2 <output>
        let mut child = Command::new(&self.binary)
            .arg("-y")
            .arg("-i")
            .arg(input)
            .arg("-frames:v")
            .arg("1")
            .arg("-q:v")
            .arg("2")
            .arg(output)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                TriageError::ExtractionError(format!("could not launch {}: {}", self.binary, e))
            })?;

        let status = tokio::time::timeout(self.timeout, child.wait())
            .await
            .map_err(|_| {
                TriageError::ExtractionError(format!(
                    "frame extraction timed out after {:?}",
                    self.timeout
                ))
            })?
            .map_err(|e| TriageError::ExtractionError(e.to_string()))?;

        if !status.success() {
            return Err(TriageError::ExtractionError(format!(
                "{} exited with {}",
                self.binary, status
            )));
        }

        match tokio::fs::metadata(output).await {
            Ok(meta) if meta.len() > 0 => Ok(()),
            Ok(_) => Err(TriageError::ExtractionError(format!(
                "{} produced an empty frame file",
                self.binary
            ))),
            Err(_) => Err(TriageError::ExtractionError(format!(
                "{} produced no frame file",
                self.binary
            ))),
        }
    }

    async fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }
}
