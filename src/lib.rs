pub mod config;
pub mod database;
pub mod models;
pub mod store;
pub mod projection;
pub mod lifecycle;
pub mod logging;
pub mod utils;
pub mod cli;
pub mod tui;

pub use config::Config;
pub use database::Database;
pub use lifecycle::{Lifecycle, LifecycleEvent, TaskDraft, Transition};
pub use models::{Category, Priority, Task};
pub use projection::{Filter, SortMode, TaskView};
pub use store::TaskStore;
pub use utils::Profile;
