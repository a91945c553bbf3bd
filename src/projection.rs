//! Filtered, sorted view of the task collection.
//!
//! Everything here is a pure function of its inputs: no mutation, no I/O.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::models::{category_color, category_label, Category, Task, TaskId};

/// Which tasks the list shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    All,
    Category(Category),
}

impl Filter {
    /// Every filter in display order: "all" first, then each category
    pub fn options() -> Vec<Filter> {
        let mut options = vec![Filter::All];
        options.extend(Category::ALL.iter().copied().map(Filter::Category));
        options
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Category(category) => task.category == Some(*category),
        }
    }

    pub fn next(&self) -> Filter {
        cycle(&Filter::options(), self, 1)
    }

    pub fn previous(&self) -> Filter {
        let options = Filter::options();
        cycle(&options, self, options.len() - 1)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Category(category) => category.label(),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => f.write_str("all"),
            Filter::Category(category) => write!(f, "{}", category),
        }
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Filter::All);
        }
        s.parse::<Category>().map(Filter::Category)
    }
}

/// Ordering applied inside the incomplete and completed partitions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortMode {
    /// Earliest due first
    Time,
    /// Highest priority first
    Priority,
    /// Most recently created first
    #[default]
    Default,
}

impl SortMode {
    pub const ALL: [SortMode; 3] = [SortMode::Default, SortMode::Time, SortMode::Priority];

    pub fn next(&self) -> SortMode {
        cycle(&SortMode::ALL, self, 1)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortMode::Time => "Due time",
            SortMode::Priority => "Priority",
            SortMode::Default => "Newest",
        }
    }

    fn compare(&self, a: &Task, b: &Task) -> Ordering {
        match self {
            SortMode::Time => a.due_at().cmp(&b.due_at()),
            SortMode::Priority => b.priority.rank().cmp(&a.priority.rank()),
            SortMode::Default => b.created_at.cmp(&a.created_at),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortMode::Time => "time",
            SortMode::Priority => "priority",
            SortMode::Default => "default",
        };
        f.write_str(name)
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "time" => Ok(SortMode::Time),
            "priority" => Ok(SortMode::Priority),
            "default" => Ok(SortMode::Default),
            other => Err(format!("unknown sort mode '{}'", other)),
        }
    }
}

fn cycle<T: Copy + PartialEq>(options: &[T], current: &T, step: usize) -> T {
    let index = options.iter().position(|o| o == current).unwrap_or(0);
    options[(index + step) % options.len()]
}

/// Filter, partition by completion, then order by `sort`.
/// Incomplete tasks always precede completed ones; ties keep input order.
pub fn project<'a>(tasks: &'a [Task], filter: Filter, sort: SortMode) -> Vec<&'a Task> {
    let mut visible: Vec<&Task> = tasks.iter().filter(|t| filter.matches(t)).collect();
    visible.sort_by(|a, b| {
        a.completed
            .cmp(&b.completed)
            .then_with(|| sort.compare(a, b))
    });
    visible
}

/// Display-ready view of one task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskView {
    pub id: TaskId,
    pub name: String,
    pub description: String,
    pub color: &'static str,
    pub date: String,
    pub time: String,
    pub category: &'static str,
    pub priority: &'static str,
    pub completed: bool,
}

impl TaskView {
    /// `date_format` is a chrono format string, e.g. "%-d. %-m. %Y"
    pub fn build(task: &Task, date_format: &str) -> Self {
        Self {
            id: task.id.clone(),
            name: task.name.clone(),
            description: task.description.clone(),
            color: category_color(task.category),
            date: format_date(task, date_format),
            time: task.time_string(),
            category: category_label(task.category),
            priority: task.priority.label(),
            completed: task.completed,
        }
    }
}

/// Format the due date, falling back to ISO when the format string is invalid
fn format_date(task: &Task, date_format: &str) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    if write!(out, "{}", task.date.format(date_format)).is_err() {
        return task.date.format("%Y-%m-%d").to_string();
    }
    out
}

/// Project and convert to view-models in one step
pub fn project_views(tasks: &[Task], filter: Filter, sort: SortMode, date_format: &str) -> Vec<TaskView> {
    project(tasks, filter, sort)
        .into_iter()
        .map(|task| TaskView::build(task, date_format))
        .collect()
}
