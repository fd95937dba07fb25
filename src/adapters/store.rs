use crate::domain::model::{Issue, StoredIssue};
use crate::domain::ports::IssueStore;
use crate::utils::error::{Result, TriageError};
use std::time::Duration;

/// PostgREST 風格的 issues 資料表客戶端。insert 要求
/// return=representation,直接拿回含 id 的完整列。
pub struct SupabaseIssueStore {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
    table: String,
}

impl SupabaseIssueStore {
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self::with_table(base_url, service_key, "issues")
    }

    pub fn with_table(
        base_url: impl Into<String>,
        service_key: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
            table: table.into(),
        }
    }
}

#[async_trait::async_trait]
impl IssueStore for SupabaseIssueStore {
    async fn insert(&self, issue: &Issue) -> Result<StoredIssue> {
        let url = format!("{}/rest/v1/{}", self.base_url, self.table);

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .header("Prefer", "return=representation")
            .json(issue)
            .send()
            .await
            .map_err(|e| TriageError::PersistenceError(format!("table unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TriageError::PersistenceError(format!(
                "{} from {}",
                status, url
            )));
        }

        let rows: Vec<StoredIssue> = response.json().await.map_err(|e| {
            TriageError::PersistenceError(format!("unparseable representation: {}", e))
        })?;
        rows.into_iter().next().ok_or_else(|| {
            TriageError::PersistenceError("insert returned no representation".into())
        })
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<StoredIssue>> {
        let url = format!(
            "{}/rest/v1/{}?select=*&order=created_at.desc&limit={}",
            self.base_url, self.table, limit
        );

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .send()
            .await
            .map_err(|e| TriageError::PersistenceError(format!("table unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TriageError::PersistenceError(format!(
                "{} from {}",
                status, url
            )));
        }

        response
            .json()
            .await
            .map_err(|e| TriageError::PersistenceError(format!("unparseable rows: {}", e)))
    }
}
