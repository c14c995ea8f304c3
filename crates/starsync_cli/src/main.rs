//! Starsync CLI - keep a database of your GitHub stars with AI summaries.

mod commands;
mod config;
mod progress;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use console::{Term, style};
use starsync::SyncError;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "starsync")]
#[command(version)]
#[command(about = "Sync your GitHub stars into a database with AI-generated summaries")]
#[command(
    long_about = "Starsync fetches the repositories you starred on GitHub, summarizes new \
ones with an OpenAI-compatible model and keeps a local database in step with your stars. \
Repositories you unstar are archived, never deleted, and come back if you star them again."
)]
#[command(after_long_help = r#"EXAMPLES
    Sync your stars:
        $ starsync sync

    Preview what would change without calling the model or writing:
        $ starsync sync --dry-run

    Regenerate every summary in German:
        $ STARSYNC_LLM_LANGUAGE=German starsync sync --force-resummarize

    Show what is stored:
        $ starsync status

CONFIGURATION
    Starsync reads configuration from:
      1. ~/.config/starsync/config.toml (or $XDG_CONFIG_HOME/starsync/config.toml)
      2. ./starsync.toml
      3. Environment variables (STARSYNC_* prefix, e.g., STARSYNC_GITHUB_TOKEN)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    STARSYNC_DATABASE_URL     Database connection string (default: ~/.local/state/starsync/starsync.db)
    STARSYNC_GITHUB_TOKEN     GitHub personal access token (or GITHUB_TOKEN)
    STARSYNC_GITHUB_USER      Whose stars to sync (or GITHUB_USERNAME)
    STARSYNC_LLM_KEY          Summarizer API key (or OPENAI_API_KEY)
    STARSYNC_LLM_URL          Summarizer base URL (or OPENAI_BASE_URL)
    STARSYNC_LLM_MODEL        Summarizer model (or OPENAI_MODEL)
    STARSYNC_LLM_LANGUAGE     Summary language (or SUMMARY_LANGUAGE)
    STARSYNC_SYNC_CONCURRENCY Parallel summaries and writes (or SYNC_CONCURRENCY)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync starred repositories into the database
    Sync(SyncArgs),
    /// Show what the database holds
    Status,
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
    /// Generate man page(s)
    Man {
        /// Output directory for man pages (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Rollback the last migration
    Down,
    /// Show migration status
    Status,
    /// Fresh install - drop all tables and reapply migrations
    Fresh,
}

/// Options for a sync pass.
#[derive(Debug, Clone, Default, Args)]
struct SyncArgs {
    /// Sync this user's stars instead of the token owner's
    #[arg(short, long)]
    user: Option<String>,

    /// Regenerate summaries even where one exists
    #[arg(short = 'f', long)]
    force_resummarize: bool,

    /// Dry run - show what would be done without summarizing or writing
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Only process the first N starred repositories
    #[arg(short, long)]
    limit: Option<usize>,

    /// Don't archive repositories that are no longer starred
    #[arg(long)]
    no_archive: bool,

    /// Retry repositories whose last summary came back empty
    #[arg(long)]
    include_empty_summary: bool,

    /// Maximum parallel summaries and writes (default from config or 5)
    #[arg(short, long)]
    concurrency: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Structured logging only when not attached to a terminal
    if !Term::stdout().is_term() {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new("starsync=info,starsync_cli=info"),
        };

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    let config = config::Config::load();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Completions { shell } => {
            commands::meta::handle_completions(*shell)?;
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Man { output } => {
            commands::meta::handle_man(output.clone())?;
            return Ok(ExitCode::SUCCESS);
        }
        _ => {}
    }

    let database_url = config
        .database_url()
        .ok_or("Could not determine a database location; set STARSYNC_DATABASE_URL")?;

    if database_url.starts_with("sqlite://") {
        let db_path = database_url.trim_start_matches("sqlite://");
        let db_path = db_path.split('?').next().unwrap_or(db_path);
        let db_path = std::path::Path::new(db_path);

        if db_path.is_relative() && !db_path.as_os_str().is_empty() {
            tracing::warn!(
                "Database path '{}' is relative - behavior depends on current directory. \
                 Consider using an absolute path.",
                db_path.display()
            );
        }

        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
    }

    match cli.command {
        Commands::Sync(args) => {
            let result = commands::sync::handle_sync(args, &config, &database_url).await;
            return sync_exit(result);
        }
        Commands::Status => {
            commands::status::handle_status(&database_url).await?;
        }
        Commands::Migrate { action } => {
            commands::migrate::handle_migrate(action, &database_url).await?;
        }
        Commands::Completions { .. } | Commands::Man { .. } => {}
    }

    Ok(ExitCode::SUCCESS)
}

/// A pass that aborted before writing exits non-zero with a short message.
/// Item-level failures never reach here; they are part of the report.
fn sync_exit(
    result: Result<(), Box<dyn std::error::Error>>,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) if err.is::<SyncError>() => {
            eprintln!("{} {}", style("Aborted:").red().bold(), err);
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_sync_flags() {
        let cli = Cli::try_parse_from([
            "starsync",
            "sync",
            "--user",
            "octocat",
            "--dry-run",
            "--limit",
            "3",
            "--no-archive",
            "-c",
            "2",
        ])
        .expect("valid arguments");

        let Commands::Sync(args) = cli.command else {
            panic!("expected sync");
        };
        assert_eq!(args.user.as_deref(), Some("octocat"));
        assert!(args.dry_run);
        assert_eq!(args.limit, Some(3));
        assert!(args.no_archive);
        assert!(!args.force_resummarize);
        assert_eq!(args.concurrency, Some(2));
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_sync_exit_separates_abort_from_other_errors() {
        assert!(sync_exit(Ok(())).is_ok());

        let aborted = SyncError::Index(starsync::IndexError::unavailable("database locked"));
        assert!(sync_exit(Err(Box::new(aborted))).is_ok());

        let misconfigured: Box<dyn std::error::Error> = "No GitHub token configured".into();
        let err = sync_exit(Err(misconfigured)).expect_err("configuration errors propagate");
        assert!(err.to_string().contains("GitHub token"));
    }
}
