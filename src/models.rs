use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest accepted hour value; anything above coerces to zero
pub const MAX_HOUR: u32 = 23;
/// Largest accepted minute value; anything above coerces to zero
pub const MAX_MINUTE: u32 = 59;

/// Display color for tasks without a category
pub const UNSET_CATEGORY_COLOR: &str = "#6C757D";

pub type TaskId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Personal,
    Work,
    Academics,
    Health,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Personal,
        Category::Work,
        Category::Academics,
        Category::Health,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Personal => "personal",
            Category::Work => "work",
            Category::Academics => "academics",
            Category::Health => "health",
        }
    }

    /// Human-cased label shown in lists and forms
    pub fn label(&self) -> &'static str {
        match self {
            Category::Personal => "Personal",
            Category::Work => "Work",
            Category::Academics => "Academics",
            Category::Health => "Health",
        }
    }

    pub fn color_hex(&self) -> &'static str {
        match self {
            Category::Personal => "#6F42C1",
            Category::Work => "#FFC107",
            Category::Academics => "#007BFF",
            Category::Health => "#4CAF50",
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
            "personal" => Ok(Category::Personal),
            "work" => Ok(Category::Work),
            "academics" => Ok(Category::Academics),
            "health" => Ok(Category::Health),
            other => Err(format!("unknown category '{}'", other)),
        }
    }
}

/// Resolve the display color for an optional category
pub fn category_color(category: Option<Category>) -> &'static str {
    category.map(|c| c.color_hex()).unwrap_or(UNSET_CATEGORY_COLOR)
}

/// Resolve the display label for an optional category
pub fn category_label(category: Option<Category>) -> &'static str {
    category.map(|c| c.label()).unwrap_or("None")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    /// Sort rank: higher ranks are listed first when sorting by priority
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority '{}'", other)),
        }
    }
}

/// A single to-do record, serialized with the field names of the persisted slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,  // Serialized as YYYY-MM-DD
    pub hour: String,     // Always two digits, 00-23
    pub minute: String,   // Always two digits, 00-59
    #[serde(default, with = "category_field")]
    pub category: Option<Category>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
    pub created_at: i64,  // Epoch milliseconds
}

/// Every field of a task that may be overwritten after creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPatch {
    pub name: String,
    pub description: String,
    pub date: NaiveDate,
    pub hour: String,
    pub minute: String,
    pub category: Option<Category>,
    pub priority: Priority,
}

impl Task {
    /// Create a new incomplete task with a fresh id and the current timestamp
    pub fn new(patch: TaskPatch) -> Self {
        Self::with_identity(
            uuid::Uuid::new_v4().to_string(),
            chrono::Utc::now().timestamp_millis(),
            patch,
        )
    }

    pub fn with_identity(id: TaskId, created_at: i64, patch: TaskPatch) -> Self {
        Self {
            id,
            name: patch.name,
            description: patch.description,
            date: patch.date,
            hour: coerce_hour(&patch.hour),
            minute: coerce_minute(&patch.minute),
            category: patch.category,
            priority: patch.priority,
            completed: false,
            created_at,
        }
    }

    /// Overwrite the mutable fields; id, completion and creation time stay untouched
    pub fn apply(&mut self, patch: TaskPatch) {
        self.name = patch.name;
        self.description = patch.description;
        self.date = patch.date;
        self.hour = coerce_hour(&patch.hour);
        self.minute = coerce_minute(&patch.minute);
        self.category = patch.category;
        self.priority = patch.priority;
    }

    /// Combined due instant used for time ordering
    pub fn due_at(&self) -> NaiveDateTime {
        let hour = parse_time_component(&self.hour, MAX_HOUR);
        let minute = parse_time_component(&self.minute, MAX_MINUTE);
        self.date
            .and_hms_opt(hour, minute, 0)
            .unwrap_or_else(|| NaiveDateTime::new(self.date, NaiveTime::default()))
    }

    /// Time of day as HH:MM
    pub fn time_string(&self) -> String {
        format!("{}:{}", self.hour, self.minute)
    }
}

/// Coerce raw hour input into a two-digit string
pub fn coerce_hour(input: &str) -> String {
    coerce_time_component(input, MAX_HOUR)
}

/// Coerce raw minute input into a two-digit string
pub fn coerce_minute(input: &str) -> String {
    coerce_time_component(input, MAX_MINUTE)
}

/// Parse the leading integer of `input` and zero-pad it to two digits.
/// Non-numeric, negative or out-of-range input becomes "00".
pub fn coerce_time_component(input: &str, max: u32) -> String {
    format!("{:02}", parse_time_component(input, max))
}

fn parse_time_component(input: &str, max: u32) -> u32 {
    let trimmed = input.trim_start();
    let (negative, rest) = if let Some(rest) = trimmed.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = trimmed.strip_prefix('+') {
        (false, rest)
    } else {
        (false, trimmed)
    };

    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..end];
    if digits.is_empty() {
        return 0;
    }

    // Overflowing digit runs are out of range as well
    let value: u64 = match digits.parse() {
        Ok(value) => value,
        Err(_) => return 0,
    };
    if negative && value != 0 {
        return 0;
    }
    if value > u64::from(max) {
        0
    } else {
        value as u32
    }
}

/// Unset categories travel as an empty string in the persisted payload
mod category_field {
    use super::Category;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Category>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.map(|c| c.as_str()).unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Category>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch(name: &str) -> TaskPatch {
        TaskPatch {
            name: name.to_string(),
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            hour: "9".to_string(),
            minute: "5".to_string(),
            category: None,
            priority: Priority::Medium,
        }
    }

    #[test]
    fn time_components_are_zero_padded() {
        assert_eq!(coerce_hour("5"), "05");
        assert_eq!(coerce_hour("23"), "23");
        assert_eq!(coerce_minute("0"), "00");
        assert_eq!(coerce_minute("007"), "07");
    }

    #[test]
    fn non_numeric_time_coerces_to_zero() {
        assert_eq!(coerce_hour("abc"), "00");
        assert_eq!(coerce_hour(""), "00");
        assert_eq!(coerce_minute("  "), "00");
    }

    #[test]
    fn time_parsing_uses_leading_digits() {
        assert_eq!(coerce_hour(" 7pm"), "07");
        assert_eq!(coerce_minute("+30"), "30");
        assert_eq!(coerce_minute("15.9"), "15");
    }

    #[test]
    fn out_of_range_time_coerces_to_zero() {
        assert_eq!(coerce_hour("24"), "00");
        assert_eq!(coerce_hour("-3"), "00");
        assert_eq!(coerce_minute("60"), "00");
        assert_eq!(coerce_minute("99999999999999999999999"), "00");
    }

    #[test]
    fn new_task_normalizes_time_and_starts_incomplete() {
        let task = Task::new(patch("Write report"));
        assert_eq!(task.hour, "09");
        assert_eq!(task.minute, "05");
        assert!(!task.completed);
        assert!(!task.id.is_empty());
        assert_eq!(task.time_string(), "09:05");
    }

    #[test]
    fn apply_keeps_identity_fields() {
        let mut task = Task::with_identity("t-1".to_string(), 42, patch("Before"));
        task.completed = true;

        let mut update = patch("After");
        update.priority = Priority::High;
        task.apply(update);

        assert_eq!(task.id, "t-1");
        assert_eq!(task.created_at, 42);
        assert!(task.completed);
        assert_eq!(task.name, "After");
        assert_eq!(task.priority, Priority::High);
    }

    #[test]
    fn serializes_with_persisted_field_names() {
        let task = Task::with_identity("t-1".to_string(), 1700000000000, patch("Gym"));
        let json = serde_json::to_value(&task).unwrap();

        assert_eq!(json["id"], "t-1");
        assert_eq!(json["date"], "2025-03-14");
        assert_eq!(json["hour"], "09");
        assert_eq!(json["category"], "");
        assert_eq!(json["priority"], "medium");
        assert_eq!(json["completed"], false);
        assert_eq!(json["createdAt"], 1700000000000i64);
    }

    #[test]
    fn empty_or_missing_category_deserializes_as_unset() {
        let with_empty = r#"{"id":"a","name":"n","description":"","date":"2025-01-02","hour":"01","minute":"02","category":"","priority":"low","completed":false,"createdAt":1}"#;
        let task: Task = serde_json::from_str(with_empty).unwrap();
        assert_eq!(task.category, None);

        let missing = r#"{"id":"a","name":"n","date":"2025-01-02","hour":"01","minute":"02","priority":"high","createdAt":1}"#;
        let task: Task = serde_json::from_str(missing).unwrap();
        assert_eq!(task.category, None);
        assert_eq!(task.description, "");
        assert!(!task.completed);
    }

    #[test]
    fn category_parsing_and_labels() {
        assert_eq!("Work".parse::<Category>(), Ok(Category::Work));
        assert!("garden".parse::<Category>().is_err());
        assert_eq!(category_label(Some(Category::Academics)), "Academics");
        assert_eq!(category_label(None), "None");
        assert_eq!(category_color(Some(Category::Health)), "#4CAF50");
        assert_eq!(category_color(None), UNSET_CATEGORY_COLOR);
    }

    #[test]
    fn due_at_combines_date_and_time() {
        let task = Task::with_identity("t".to_string(), 0, patch("x"));
        assert_eq!(task.due_at().format("%Y-%m-%d %H:%M").to_string(), "2025-03-14 09:05");
    }
}
