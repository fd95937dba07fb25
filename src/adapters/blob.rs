use crate::domain::ports::BlobStore;
use crate::utils::error::{Result, TriageError};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Supabase storage 下載端。檔案參照可能是完整 URL,
/// 只取最後一段路徑當物件名稱。
pub struct SupabaseBlobStore {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
    bucket: String,
}

impl SupabaseBlobStore {
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self::with_bucket(base_url, service_key, "media")
    }

    pub fn with_bucket(
        base_url: impl Into<String>,
        service_key: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
            bucket: bucket.into(),
        }
    }

    /// 物件名稱 = 參照的最後一段路徑。能解析成 URL 就用 URL 的
    /// path segment(query/fragment 自然被剝掉),否則退回字串切割。
    pub fn object_name(reference: &str) -> String {
        if let Ok(url) = Url::parse(reference) {
            if let Some(segments) = url.path_segments() {
                if let Some(last) = segments.filter(|s| !s.is_empty()).last() {
                    return last.to_string();
                }
            }
        }
        reference
            .rsplit('/')
            .next()
            .unwrap_or(reference)
            .to_string()
    }
}

impl BlobStore for SupabaseBlobStore {
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>> {
        let name = Self::object_name(reference);
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.bucket, name
        );
        tracing::debug!("Fetching object '{}' from bucket '{}'", name, self.bucket);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .send()
            .await
            .map_err(|e| TriageError::FetchError(format!("storage unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TriageError::FetchError(format!(
                "{} for object '{}'",
                status, name
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TriageError::FetchError(format!("body read failed: {}", e)))?;
        Ok(bytes.to_vec())
    }
}

/// 本機檔案系統版本,離線跑與測試用。
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    base_path: PathBuf,
}

impl LocalBlobStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

impl BlobStore for LocalBlobStore {
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>> {
        let name = SupabaseBlobStore::object_name(reference);
        let full_path = self.base_path.join(name);
        tokio::fs::read(&full_path).await.map_err(|e| {
            TriageError::FetchError(format!("{}: {}", full_path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_name_from_full_url() {
        assert_eq!(
            SupabaseBlobStore::object_name("https://x.supabase.co/storage/v1/object/media/report.jpg"),
            "report.jpg"
        );
        assert_eq!(
            SupabaseBlobStore::object_name("https://cdn.example.com/a/b/voice.mp3?token=abc"),
            "voice.mp3"
        );
    }

    #[test]
    fn test_object_name_from_bare_reference() {
        assert_eq!(SupabaseBlobStore::object_name("report.jpg"), "report.jpg");
        assert_eq!(SupabaseBlobStore::object_name("media/clip.mp4"), "clip.mp4");
    }

    #[tokio::test]
    async fn test_local_store_reads_existing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("report.jpg"), b"jpeg bytes").unwrap();
        let store = LocalBlobStore::new(dir.path());

        let bytes = store
            .fetch("https://cdn.example.com/media/report.jpg")
            .await
            .unwrap();

        assert_eq!(bytes, b"jpeg bytes");
    }

    #[tokio::test]
    async fn test_local_store_missing_file_is_fetch_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = LocalBlobStore::new(dir.path());

        let err = store.fetch("missing.png").await.unwrap_err();

        assert!(matches!(err, TriageError::FetchError(_)));
    }
}
