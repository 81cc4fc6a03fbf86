//! Action item data model: tasks, categories and request payloads.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Max stored length of a machine-generated task.
pub const MAX_TASK_CHARS: usize = 200;

/// Default priority for new items (1 = high, 3 = low).
pub const DEFAULT_PRIORITY: i32 = 2;

/// Life domain a task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Health,
    Finance,
    Study,
    Personal,
    Work,
    General,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Health => "Health",
            Category::Finance => "Finance",
            Category::Study => "Study",
            Category::Personal => "Personal",
            Category::Work => "Work",
            Category::General => "General",
        }
    }

    /// Display colour used by list views.
    pub fn color(&self) -> &'static str {
        match self {
            Category::Health => "#2ecc71",
            Category::Finance => "#f39c12",
            Category::Study => "#3498db",
            Category::Personal => "#9b59b6",
            Category::Work => "#e74c3c",
            Category::General => "#95a5a6",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "health" => Ok(Category::Health),
            "finance" => Ok(Category::Finance),
            "study" => Ok(Category::Study),
            "personal" => Ok(Category::Personal),
            "work" => Ok(Category::Work),
            "general" => Ok(Category::General),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// Who created a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionSource {
    User,
    AiAgent,
}

impl ActionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionSource::User => "user",
            ActionSource::AiAgent => "ai_agent",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "ai_agent" => ActionSource::AiAgent,
            _ => ActionSource::User,
        }
    }
}

/// A single to-do row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub task: String,
    pub category: Category,
    pub source: ActionSource,
    /// 1 = high, 2 = medium, 3 = low.
    pub priority: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ActionItem {
    /// Create a new pending item with default priority.
    pub fn new(
        user_id: Uuid,
        task: impl Into<String>,
        category: Category,
        source: ActionSource,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            task: task.into(),
            category,
            source,
            priority: DEFAULT_PRIORITY,
            due_date: None,
            completed: false,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Builder: set priority (clamped to 1..=3).
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority.clamp(1, 3);
        self
    }

    /// Builder: set due date.
    pub fn with_due_date(mut self, due: NaiveDate) -> Self {
        self.due_date = Some(due);
        self
    }
}

/// Body of `POST /api/actions`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewActionRequest {
    pub task: String,
    pub category: Category,
    #[serde(default)]
    pub priority: Option<i32>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_item_defaults() {
        let user = Uuid::new_v4();
        let item = ActionItem::new(user, "Drink water", Category::Health, ActionSource::User);
        assert_eq!(item.user_id, user);
        assert_eq!(item.priority, DEFAULT_PRIORITY);
        assert!(!item.completed);
        assert!(item.completed_at.is_none());
        assert!(item.due_date.is_none());
    }

    #[test]
    fn priority_is_clamped() {
        let item = ActionItem::new(Uuid::new_v4(), "x", Category::Work, ActionSource::User)
            .with_priority(9);
        assert_eq!(item.priority, 3);
        let item = item.with_priority(-1);
        assert_eq!(item.priority, 1);
    }

    #[test]
    fn category_parses_labels() {
        assert_eq!("finance".parse::<Category>().unwrap(), Category::Finance);
        assert_eq!(" Study ".parse::<Category>().unwrap(), Category::Study);
        assert!("chores".parse::<Category>().is_err());
        assert_eq!(Category::Personal.to_string(), "Personal");
    }

    #[test]
    fn source_serde_snake_case() {
        let json = serde_json::to_string(&ActionSource::AiAgent).unwrap();
        assert_eq!(json, "\"ai_agent\"");
        assert_eq!(ActionSource::parse("ai_agent"), ActionSource::AiAgent);
        assert_eq!(ActionSource::parse("anything"), ActionSource::User);
    }

    #[test]
    fn optional_fields_omitted() {
        let item = ActionItem::new(Uuid::new_v4(), "T", Category::General, ActionSource::User);
        let json = serde_json::to_string(&item).unwrap();
        assert!(!json.contains("\"due_date\""));
        assert!(!json.contains("\"completed_at\""));
    }
}
