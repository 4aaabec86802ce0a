use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "pomoquest-cli", version, about = "Pomoquest CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run and plan focus sessions
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Progress statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Badge catalog and earned badges
    Badges {
        #[command(subcommand)]
        action: commands::badges::BadgesAction,
    },
    /// Session log
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// Coins, level and reset operations
    Progress {
        #[command(subcommand)]
        action: commands::progress::ProgressAction,
    },
    /// Record a session that was timed elsewhere
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("POMOQUEST_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Badges { action } => commands::badges::run(action),
        Commands::History { action } => commands::history::run(action),
        Commands::Progress { action } => commands::progress::run(action),
        Commands::Session { action } => commands::session::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
