use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status every issue carries at creation; later transitions happen downstream.
pub const STATUS_PENDING: &str = "pending";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub description: String,
    pub reporter_id: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub file_reference: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modality {
    Image,
    Audio,
    Video,
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Pothole,
    Garbage,
    BrokenLight,
    Graffiti,
    TreeFall,
    WaterLeak,
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Pothole,
        Category::Garbage,
        Category::BrokenLight,
        Category::Graffiti,
        Category::TreeFall,
        Category::WaterLeak,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Pothole => "pothole",
            Category::Garbage => "garbage",
            Category::BrokenLight => "broken_light",
            Category::Graffiti => "graffiti",
            Category::TreeFall => "tree_fall",
            Category::WaterLeak => "water_leak",
            Category::Other => "other",
        }
    }

    /// Maps untrusted model output onto the closed set. Normalization is
    /// lowercase + trim; anything that is not an exact member collapses to
    /// `Other`.
    pub fn from_response(raw: &str) -> Category {
        let normalized = raw.trim().to_lowercase();
        Category::ALL
            .iter()
            .find(|c| c.as_str() == normalized)
            .copied()
            .unwrap_or(Category::Other)
    }

    pub fn priority(self) -> Priority {
        match self {
            Category::Other => Priority::Low,
            _ => Priority::High,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::High => "high",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub description: String,
    pub lat: f64,
    pub lng: f64,
    pub status: String,
    pub category: Category,
    pub priority: Priority,
    pub file_reference: Option<String>,
    pub reporter_id: String,
}

impl Issue {
    pub fn assemble(
        submission: &Submission,
        description: String,
        category: Category,
        priority: Priority,
    ) -> Issue {
        Issue {
            description,
            lat: submission.lat,
            lng: submission.lng,
            status: STATUS_PENDING.to_string(),
            category,
            priority,
            file_reference: submission.file_reference.clone(),
            reporter_id: submission.reporter_id.clone(),
        }
    }
}

/// Row shape returned by the persistence table. `status` stays free text
/// because rows read back may have been transitioned by downstream systems.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredIssue {
    pub id: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub issue: Issue,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_response_normalizes_casing_and_padding() {
        assert_eq!(Category::from_response(" Pothole \n"), Category::Pothole);
        assert_eq!(Category::from_response("GARBAGE"), Category::Garbage);
        assert_eq!(Category::from_response("broken_light"), Category::BrokenLight);
        assert_eq!(Category::from_response("\ttree_fall"), Category::TreeFall);
    }

    #[test]
    fn test_category_from_response_rejects_non_members() {
        assert_eq!(Category::from_response(""), Category::Other);
        assert_eq!(Category::from_response("Pothole!"), Category::Other);
        assert_eq!(Category::from_response("multi word"), Category::Other);
        assert_eq!(Category::from_response("banana"), Category::Other);
        assert_eq!(Category::from_response("broken light"), Category::Other);
    }

    #[test]
    fn test_priority_is_pure_function_of_category() {
        for category in Category::ALL {
            let expected = if category == Category::Other {
                Priority::Low
            } else {
                Priority::High
            };
            assert_eq!(category.priority(), expected);
            // Repeated calls never change the answer
            assert_eq!(category.priority(), category.priority());
        }
    }

    #[test]
    fn test_category_serializes_as_snake_case_label() {
        let value = serde_json::to_value(Category::BrokenLight).unwrap();
        assert_eq!(value, serde_json::json!("broken_light"));
        let value = serde_json::to_value(Category::WaterLeak).unwrap();
        assert_eq!(value, serde_json::json!("water_leak"));
    }

    #[test]
    fn test_issue_assemble_fixes_pending_status() {
        let submission = Submission {
            description: "pothole near the crossing".into(),
            reporter_id: "citizen-7".into(),
            lat: 25.04,
            lng: 121.56,
            file_reference: Some("https://cdn.example.com/media/report.jpg".into()),
        };

        let issue = Issue::assemble(
            &submission,
            submission.description.clone(),
            Category::Pothole,
            Category::Pothole.priority(),
        );

        assert_eq!(issue.status, STATUS_PENDING);
        assert_eq!(issue.category, Category::Pothole);
        assert_eq!(issue.priority, Priority::High);
        assert_eq!(issue.reporter_id, "citizen-7");
        assert_eq!(
            issue.file_reference.as_deref(),
            Some("https://cdn.example.com/media/report.jpg")
        );
    }

    #[test]
    fn test_stored_issue_deserializes_flattened_row() {
        let row = serde_json::json!({
            "id": 42,
            "created_at": "2025-06-01T08:30:00Z",
            "description": "overflowing bin",
            "lat": 25.0,
            "lng": 121.5,
            "status": "pending",
            "category": "garbage",
            "priority": "high",
            "file_reference": null,
            "reporter_id": "citizen-3"
        });

        let stored: StoredIssue = serde_json::from_value(row).unwrap();
        assert_eq!(stored.id, 42);
        assert_eq!(stored.issue.category, Category::Garbage);
        assert!(stored.created_at.is_some());
    }
}
