use crate::domain::model::{Issue, StoredIssue, Submission};
use crate::domain::ports::{IssueStore, Pipeline};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use crate::utils::validation::Validate;
use std::time::Instant;

/// 包在管線外的引擎:先驗證前置條件,再跑管線,
/// 需要時透過持久層寫入。驗證失敗是唯一會拒絕投訴的路徑。
pub struct TriageEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> TriageEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// 驗證 + 管線。管線本身是全函數,這裡唯一的錯誤來源是驗證。
    pub async fn process(&self, submission: &Submission) -> Result<Issue> {
        submission.validate()?;

        tracing::info!(
            "🚀 Processing submission from '{}' (attachment: {})",
            submission.reporter_id,
            submission.file_reference.as_deref().unwrap_or("none")
        );
        self.monitor.log_stats("Triage start");

        let started = Instant::now();
        let issue = self.pipeline.process(submission).await;

        self.monitor.log_stats("Triage done");
        tracing::info!(
            "✅ Triage finished in {:?}: category '{}', priority '{}'",
            started.elapsed(),
            issue.category,
            issue.priority
        );

        Ok(issue)
    }

    /// 完整流程:驗證、管線、寫入持久層。寫入是這個核心裡
    /// 唯一往上傳的失敗。
    pub async fn submit<S: IssueStore>(
        &self,
        submission: &Submission,
        store: &S,
    ) -> Result<StoredIssue> {
        let issue = self.process(submission).await?;
        let stored = store.insert(&issue).await?;
        self.monitor.log_final_stats();
        tracing::info!("💾 Issue stored with id {}", stored.id);
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Category, Priority};
    use crate::utils::error::TriageError;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FixedPipeline {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl Pipeline for FixedPipeline {
        async fn process(&self, submission: &Submission) -> Issue {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Issue::assemble(
                submission,
                submission.description.clone(),
                Category::Pothole,
                Category::Pothole.priority(),
            )
        }
    }

    struct MemoryStore {
        fail: bool,
    }

    #[async_trait::async_trait]
    impl IssueStore for MemoryStore {
        async fn insert(&self, issue: &Issue) -> Result<StoredIssue> {
            if self.fail {
                return Err(TriageError::PersistenceError("503 from table".into()));
            }
            Ok(StoredIssue {
                id: 7,
                created_at: Some(Utc::now()),
                issue: issue.clone(),
            })
        }

        async fn list_recent(&self, _limit: usize) -> Result<Vec<StoredIssue>> {
            Ok(vec![])
        }
    }

    fn submission(description: &str, reporter_id: &str) -> Submission {
        Submission {
            description: description.to_string(),
            reporter_id: reporter_id.to_string(),
            lat: 25.03,
            lng: 121.52,
            file_reference: None,
        }
    }

    #[tokio::test]
    async fn test_process_runs_pipeline_for_valid_submission() {
        let calls = Arc::new(AtomicUsize::new(0));
        let engine = TriageEngine::new(FixedPipeline {
            calls: calls.clone(),
        });

        let issue = engine
            .process(&submission("pothole on 5th ave", "citizen-1"))
            .await
            .unwrap();

        assert_eq!(issue.category, Category::Pothole);
        assert_eq!(issue.priority, Priority::High);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_submission_is_rejected_before_pipeline_runs() {
        let calls = Arc::new(AtomicUsize::new(0));
        let engine = TriageEngine::new(FixedPipeline {
            calls: calls.clone(),
        });

        let err = engine
            .process(&submission("", "citizen-1"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            TriageError::MissingFieldError { ref field } if field == "description"
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_submit_returns_stored_row() {
        let engine = TriageEngine::new(FixedPipeline {
            calls: Arc::new(AtomicUsize::new(0)),
        });
        let store = MemoryStore { fail: false };

        let stored = engine
            .submit(&submission("pothole on 5th ave", "citizen-1"), &store)
            .await
            .unwrap();

        assert_eq!(stored.id, 7);
        assert_eq!(stored.issue.category, Category::Pothole);
    }

    #[tokio::test]
    async fn test_submit_surfaces_persistence_failure() {
        let engine = TriageEngine::new(FixedPipeline {
            calls: Arc::new(AtomicUsize::new(0)),
        });
        let store = MemoryStore { fail: true };

        let err = engine
            .submit(&submission("pothole on 5th ave", "citizen-1"), &store)
            .await
            .unwrap_err();

        assert!(matches!(err, TriageError::PersistenceError(_)));
    }
}
