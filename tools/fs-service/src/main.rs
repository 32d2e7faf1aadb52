use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fs_service::config::{ADAPTER_ENV, DIR_MODE_ENV};
use fs_service::{FileService, FileSystem, LogEventSink};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "fs-service")]
#[command(about = "Run file operations through a storage adapter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Storage adapter to use (defaults to $FS_SERVICE_ADAPTER or local)
    #[arg(short, long, global = true)]
    adapter: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write data to DIR/FILENAME
    Write {
        dir: PathBuf,
        filename: String,
        data: String,
    },

    /// Print file contents
    Read { path: PathBuf },

    /// Delete a file
    Delete { path: PathBuf },

    /// Check whether a path exists (exit status 1 if not)
    Exists { path: PathBuf },

    /// Check whether a path is a directory (exit status 1 if not)
    IsDir { path: PathBuf },

    /// Print the file extension
    Ext { path: PathBuf },

    /// Print the media type detected from file contents
    Mime { path: PathBuf },

    /// Create a directory and any missing parents
    Mkdir { path: PathBuf },

    /// Copy a file to a file, or a directory into a directory
    Copy { src: PathBuf, dst: PathBuf },

    /// List every file below a directory
    Ls {
        path: PathBuf,

        /// Directory to skip (may be repeated)
        #[arg(short, long)]
        exclude: Vec<PathBuf>,
    },

    /// Print a directory path relative to a base
    Relpath {
        full_path: PathBuf,
        file_name: String,

        /// Base path (defaults to the parent directory)
        #[arg(short, long)]
        base: Option<PathBuf>,
    },
}

fn build_service(adapter: Option<String>) -> Result<FileService> {
    let mut pairs = Vec::new();
    if let Some(adapter) = adapter.or_else(|| std::env::var(ADAPTER_ENV).ok()) {
        pairs.push(("adapter", adapter));
    }
    if let Ok(mode) = std::env::var(DIR_MODE_ENV) {
        pairs.push(("dir_mode", mode));
    }

    FileService::init(pairs, &LogEventSink).context("Failed to initialize file service")
}

fn print_flag(flag: bool) -> ExitCode {
    println!("{}", flag);
    if flag {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run(service: &FileService, command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Write { dir, filename, data } => {
            let written = service
                .write(data.as_bytes(), &filename, &dir)
                .with_context(|| format!("Failed to write {}", dir.join(&filename).display()))?;
            println!("{}", written.display());
        }
        Commands::Read { path } => {
            let data = service
                .read(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            std::io::stdout().write_all(&data)?;
        }
        Commands::Delete { path } => {
            service
                .delete(&path)
                .with_context(|| format!("Failed to delete {}", path.display()))?;
        }
        Commands::Exists { path } => return Ok(print_flag(service.exists(&path))),
        Commands::IsDir { path } => return Ok(print_flag(service.is_dir(&path))),
        Commands::Ext { path } => {
            println!("{}", service.extension(&path).unwrap_or_default());
        }
        Commands::Mime { path } => {
            let mime = service
                .mime(&path)
                .with_context(|| format!("Cannot detect media type of {}", path.display()))?;
            println!("{}", mime);
        }
        Commands::Mkdir { path } => {
            let created = service
                .mk_dir(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            println!("{}", created);
        }
        Commands::Copy { src, dst } => {
            let copied = service
                .copy_path(&src, &dst)
                .with_context(|| format!("Failed to copy {} to {}", src.display(), dst.display()))?;
            println!("{}", copied);
        }
        Commands::Ls { path, exclude } => {
            // Exclusion matches resolved paths exactly
            let restrict: Vec<PathBuf> = exclude
                .into_iter()
                .map(|p| std::fs::canonicalize(&p).unwrap_or(p))
                .collect();
            let files = service
                .dir(&path, &restrict)
                .with_context(|| format!("Failed to list {}", path.display()))?;
            for file in files {
                println!("{}", file.display());
            }
        }
        Commands::Relpath { full_path, file_name, base } => {
            println!("{}", service.relative_path(&full_path, &file_name, base.as_deref()));
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .target(env_logger::Target::Stderr)
        .init();

    let service = build_service(cli.adapter)?;
    log::info!("Using {} adapter", service.adapter_name());

    run(&service, cli.command)
}
