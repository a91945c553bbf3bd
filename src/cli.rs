use clap::{Parser, Subcommand};
use std::io::Write;
use thiserror::Error;

use crate::lifecycle::{Lifecycle, LifecycleError, LifecycleEvent, TaskDraft, Transition};
use crate::projection::{Filter, SortMode, TaskView};

#[derive(Parser)]
#[command(name = "tdl")]
#[command(about = "A terminal to-do list with categories, priorities and due times")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (uses separate dev config/database)
    #[arg(long)]
    pub dev: bool,

    /// Override the configured log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch interactive TUI (default if no subcommand)
    Tui,
    /// Quickly add a new task
    Add {
        /// Task name
        name: String,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// Due hour (0-23)
        #[arg(long, default_value = "0")]
        hour: String,
        /// Due minute (0-59)
        #[arg(long, default_value = "0")]
        minute: String,
        /// personal, work, academics or health
        #[arg(long)]
        category: Option<String>,
        /// low, medium or high
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Print the task list
    List {
        /// all or a category name
        #[arg(long)]
        filter: Option<Filter>,
        /// time, priority or default
        #[arg(long)]
        sort: Option<SortMode>,
    },
    /// Mark a task completed and delete it
    Done {
        /// Task id as shown by `list`
        id: String,
        /// Keep the completed task instead of deleting it
        #[arg(long)]
        keep: bool,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    LifecycleError(#[from] LifecycleError),
    #[error("Task not found: {0}")]
    TaskNotFound(String),
    #[error("Failed to write output: {0}")]
    OutputError(#[from] std::io::Error),
}

/// Handle the add command
pub fn handle_add(
    draft: TaskDraft,
    lifecycle: &mut Lifecycle,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match lifecycle.dispatch(LifecycleEvent::SubmitForm(draft))? {
        Transition::Created(id) => writeln!(out, "Task created successfully (ID: {})", id)?,
        other => writeln!(out, "No task created: {:?}", other)?,
    }
    Ok(())
}

/// Handle the list command
pub fn handle_list(
    filter: Option<Filter>,
    sort: Option<SortMode>,
    lifecycle: &mut Lifecycle,
    out: &mut impl Write,
) -> Result<(), CliError> {
    if let Some(filter) = filter {
        lifecycle.dispatch(LifecycleEvent::ChangeFilter(filter))?;
    }
    if let Some(sort) = sort {
        lifecycle.dispatch(LifecycleEvent::ChangeSort(sort))?;
    }

    let views = lifecycle.visible();
    if views.is_empty() {
        writeln!(out, "No tasks to show.")?;
        return Ok(());
    }
    for view in &views {
        writeln!(out, "{}", format_task_line(view))?;
    }
    Ok(())
}

/// Handle the done command
pub fn handle_done(
    id: String,
    keep: bool,
    lifecycle: &mut Lifecycle,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let transition = lifecycle.dispatch(LifecycleEvent::ToggleComplete {
        id: id.clone(),
        checked: true,
    })?;
    if transition == Transition::Ignored {
        return Err(CliError::TaskNotFound(id));
    }

    if keep {
        lifecycle.dispatch(LifecycleEvent::CancelDeletion)?;
        writeln!(out, "Task marked completed (ID: {})", id)?;
    } else {
        lifecycle.dispatch(LifecycleEvent::ConfirmDeletion)?;
        writeln!(out, "Task deleted (ID: {})", id)?;
    }
    Ok(())
}

/// One line per task: status, due, name, labels, id
pub fn format_task_line(view: &TaskView) -> String {
    let check = if view.completed { "[x]" } else { "[ ]" };
    let mut line = format!(
        "{} {} {}  {}  ({}, {})  {}",
        check, view.date, view.time, view.name, view.category, view.priority, view.id
    );
    if !view.description.is_empty() {
        line.push_str(&format!("\n      {}", view.description));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::store::TaskStore;

    fn lifecycle() -> Lifecycle {
        Lifecycle::new(TaskStore::open(Database::open_in_memory().unwrap()))
    }

    fn draft(name: &str, category: &str, hour: &str) -> TaskDraft {
        TaskDraft {
            name: name.to_string(),
            date: "2025-03-10".to_string(),
            hour: hour.to_string(),
            minute: "0".to_string(),
            category: category.to_string(),
            ..TaskDraft::default()
        }
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["tdl", "--dev", "list", "--filter", "work", "--sort", "time"]).unwrap();
        assert!(cli.dev);
        match cli.command {
            Some(Commands::List { filter, sort }) => {
                assert_eq!(filter, Some(Filter::Category(crate::models::Category::Work)));
                assert_eq!(sort, Some(SortMode::Time));
            }
            _ => panic!("expected list"),
        }

        assert!(Cli::try_parse_from(["tdl", "list", "--filter", "chores"]).is_err());
        assert!(Cli::try_parse_from(["tdl", "add", "Name"]).is_err());
        assert!(Cli::try_parse_from(["tdl"]).unwrap().command.is_none());
    }

    #[test]
    fn add_then_list_prints_tasks() {
        let mut lc = lifecycle();
        let mut buf = Vec::new();
        handle_add(draft("Report", "work", "9"), &mut lc, &mut buf).unwrap();
        handle_add(draft("Run", "health", "7"), &mut lc, &mut buf).unwrap();
        assert!(output(buf).contains("Task created successfully"));

        let mut buf = Vec::new();
        handle_list(None, Some(SortMode::Time), &mut lc, &mut buf).unwrap();
        let text = output(buf);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("07:00") && lines[0].contains("Run"));
        assert!(lines[1].contains("(Work, Low)"));

        let mut buf = Vec::new();
        handle_list(Some(Filter::Category(crate::models::Category::Personal)), None, &mut lc, &mut buf).unwrap();
        assert_eq!(output(buf).trim(), "No tasks to show.");
    }

    #[test]
    fn add_rejects_invalid_input() {
        let mut lc = lifecycle();
        let err = handle_add(draft("x", "chores", "1"), &mut lc, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, CliError::LifecycleError(LifecycleError::Validation(_))));
    }

    #[test]
    fn done_deletes_or_keeps() {
        let mut lc = lifecycle();
        handle_add(draft("A", "", "1"), &mut lc, &mut Vec::new()).unwrap();
        handle_add(draft("B", "", "2"), &mut lc, &mut Vec::new()).unwrap();
        let ids: Vec<String> = lc.store().tasks().iter().map(|t| t.id.clone()).collect();

        handle_done(ids[0].clone(), false, &mut lc, &mut Vec::new()).unwrap();
        assert!(lc.store().get(&ids[0]).is_none());

        handle_done(ids[1].clone(), true, &mut lc, &mut Vec::new()).unwrap();
        assert!(lc.store().get(&ids[1]).unwrap().completed);
        assert_eq!(lc.pending_deletion(), None);
    }

    #[test]
    fn done_unknown_id_is_an_error() {
        let mut lc = lifecycle();
        let err = handle_done("missing".to_string(), false, &mut lc, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, CliError::TaskNotFound(ref id) if id == "missing"));
    }
}
