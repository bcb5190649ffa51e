//! Wallpaper CLI - jobs that feed and maintain the wallpaper image set.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod commands;
mod exit_codes;

use exit_codes::ExitCode;

const EXIT_CODES_HELP: &str = "\
Exit codes:
  0   Success
  1   General error
  64  Usage error (invalid arguments)
  65  Data error (unparsable input)
  66  Input file or directory missing
  69  Service unavailable (image store, database, feed)
  74  I/O error
  78  Configuration error";

#[derive(Parser)]
#[command(name = "wallpaper")]
#[command(author, version, about = "Daily wallpaper image set tooling", long_about = None)]
#[command(after_help = EXIT_CODES_HELP)]
struct Cli {
    /// Verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert the images of `<RUN_TYPE>_temp.json` into the image set
    Ingest {
        /// Feed name, e.g. zh-CN
        #[arg(value_name = "RUN_TYPE")]
        run_type: String,

        /// Directory holding the feed files
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },

    /// Download the daily feed and insert its images into the image set
    Fetch {
        /// Market to download, e.g. zh-CN or en-US
        #[arg(short, long, default_value = "zh-CN")]
        market: String,

        /// Number of days to request (1-8)
        #[arg(short, long, default_value_t = 8)]
        count: u32,
    },

    /// Copy one PostgreSQL column into the image set
    Migrate,

    /// Print the effective configuration and test both connections
    Check,

    /// Remove archived records and files dated before a cutoff day
    Prune {
        /// Cutoff day, YYYY-MM-DD; earlier records and files are removed
        #[arg(value_name = "DATE")]
        date: String,

        /// Root of the archive tree
        #[arg(value_name = "DATA_DIR", default_value = "data")]
        data_dir: PathBuf,

        /// Do not copy files before changing them
        #[arg(long)]
        no_backup: bool,

        /// Where backups are written
        #[arg(long, default_value = "bak")]
        backup_dir: PathBuf,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Regenerate the README gallery from the aggregate archives
    Readme {
        /// Directory holding zh-CN_all.json and en-US_all.json
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// File to write
        #[arg(short, long, default_value = "README.md")]
        output: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "info,wallpaper=debug,wallpaper_core=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Ingest { run_type, data_dir } => {
            commands::ingest::execute(&run_type, &data_dir).await
        }
        Commands::Fetch { market, count } => commands::fetch::execute(&market, count).await,
        Commands::Migrate => commands::migrate::execute().await,
        Commands::Check => commands::check::execute().await,
        Commands::Prune {
            date,
            data_dir,
            no_backup,
            backup_dir,
            yes,
        } => {
            let backup_dir = (!no_backup).then_some(backup_dir);
            commands::prune::execute(&date, data_dir, backup_dir, yes)
        }
        Commands::Readme { data_dir, output } => commands::readme::execute(&data_dir, &output),
    }
}

#[tokio::main]
async fn main() {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit = match run(cli.command).await {
        Ok(()) => ExitCode::success(),
        Err(err) => ExitCode::from_anyhow(&err),
    };

    if let Some(message) = &exit.message {
        eprintln!("{} {}", "Error:".red().bold(), message);
    }
    std::process::exit(exit.code);
}
