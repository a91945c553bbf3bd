use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use log::error;
use tdl::{
    Config, Database, Lifecycle, Profile, TaskDraft, TaskStore,
    cli::{Cli, Commands},
};

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    let cli = Cli::parse();

    // Determine profile: --dev flag enables dev mode, otherwise use prod
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    // An explicit --config file replaces the profile's config file
    let config = match &cli.config {
        Some(path) => Config::load_from_path(&tdl::utils::expand_path(path))?,
        None => Config::load_with_profile(profile)?,
    };

    let log_dir = tdl::utils::get_log_dir(profile)
        .ok_or_else(|| eyre!("Could not determine log directory"))?;
    let log_level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let _logger = tdl::logging::init_logging(log_level, &log_dir)?;

    let db_path = config.get_database_path();
    let db = Database::new(
        db_path
            .to_str()
            .ok_or_else(|| eyre!("Database path contains invalid UTF-8"))?,
    )?;

    let mut lifecycle = Lifecycle::new(TaskStore::open(db)).with_view(
        config.initial_filter()?,
        config.initial_sort()?,
        &config.date_format,
    );

    let mut stdout = std::io::stdout();
    let result = match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let app = tdl::tui::App::new(config, lifecycle)?;
            tdl::tui::run_event_loop(app).map_err(color_eyre::Report::from)
        }
        Commands::Add {
            name,
            date,
            hour,
            minute,
            category,
            priority,
            description,
        } => {
            let draft = TaskDraft {
                name,
                description: description.unwrap_or_default(),
                date,
                hour,
                minute,
                category: category.unwrap_or_default(),
                priority: priority.unwrap_or_default(),
            };
            tdl::cli::handle_add(draft, &mut lifecycle, &mut stdout).map_err(color_eyre::Report::from)
        }
        Commands::List { filter, sort } => {
            tdl::cli::handle_list(filter, sort, &mut lifecycle, &mut stdout).map_err(color_eyre::Report::from)
        }
        Commands::Done { id, keep } => {
            tdl::cli::handle_done(id, keep, &mut lifecycle, &mut stdout).map_err(color_eyre::Report::from)
        }
    };

    if let Err(ref e) = result {
        error!("event=command_failed status=error error={}", e);
    }
    result
}
