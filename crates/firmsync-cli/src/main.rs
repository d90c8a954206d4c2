//! Firmsync - firmware source fetcher
//!
//! Usage:
//!   firmsync fetch <REPO> --branch main              # Whole repository at origin/main
//!   firmsync fetch <REPO> --src-folder src --tag 3.4 # Sparse checkout of src at a tag
//!   firmsync locate-git                              # Show the git executable in use

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use firmsync_core::prelude::*;

#[derive(Parser)]
#[command(name = "firmsync")]
#[command(about = "Fetch firmware sources from git", long_about = None)]
struct Cli {
    /// Configuration file (defaults to <config dir>/firmsync/firmsync.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check out a tag, branch or commit and print its local path
    Fetch(Box<FetchArgs>),

    /// Show the git executable that would be used
    LocateGit {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Args)]
struct FetchArgs {
    /// Repository URL
    repository: String,

    /// Sub-folder to restrict the checkout to ("/" or empty for everything)
    #[arg(long, default_value = "")]
    src_folder: String,

    #[command(flatten)]
    source: SourceArgs,

    /// Override the base storage directory
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    format: OutputFormat,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct SourceArgs {
    /// Check out a tag
    #[arg(long)]
    tag: Option<String>,

    /// Check out origin/<BRANCH>
    #[arg(long)]
    branch: Option<String>,

    /// Check out a commit hash
    #[arg(long)]
    commit: Option<String>,

    /// Use a local directory instead of git
    #[arg(long)]
    local_path: Option<String>,
}

impl SourceArgs {
    fn into_options(self) -> TargetDeviceOptions {
        let mut options = TargetDeviceOptions::default();
        if let Some(tag) = self.tag {
            options.source = FirmwareSource::GitTag;
            options.git_tag = tag;
        } else if let Some(commit) = self.commit {
            options.source = FirmwareSource::GitCommit;
            options.git_commit = commit;
        } else if let Some(path) = self.local_path {
            options.source = FirmwareSource::LocalPath;
            options.local_path = path;
        } else if let Some(branch) = self.branch {
            options.source = FirmwareSource::GitBranch;
            options.git_branch = branch;
        }
        options
    }
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable text
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "firmsync=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = FetchConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Fetch(args) => run_fetch(config, *args).await,
        Commands::LocateGit { format } => run_locate_git(&config, format).await,
    }
}

async fn run_fetch(mut config: FetchConfig, args: FetchArgs) -> Result<()> {
    if let Some(base_dir) = args.base_dir {
        config.base_directory = base_dir;
    }
    debug!(base = %config.base_directory.display(), "Using base directory");

    let downloader = FirmwareDownloader::from_config(&config)
        .await
        .context("Failed to locate git")?;
    let options = args.source.into_options();
    let result = downloader
        .fetch(&options, &args.repository, &args.src_folder)
        .await
        .with_context(|| format!("Failed to fetch firmware from {}", args.repository))?;

    match args.format {
        OutputFormat::Table => println!("{}", result.path.display()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }
    Ok(())
}

async fn run_locate_git(config: &FetchConfig, format: OutputFormat) -> Result<()> {
    let git = GitExecutable::shared(&config.search_path)
        .await
        .context("Failed to locate git")?;
    let version = git.version().map(|v| v.to_string());

    match format {
        OutputFormat::Table => {
            println!("Path:    {}", git.path().display());
            println!("Version: {}", version.as_deref().unwrap_or("unknown"));
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "path": git.path(),
                "version": version,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }
    Ok(())
}
