use clap::{Parser, Subcommand};
use mdiff::config::{ApplyConfig, ExtractConfig};
use mdiff::logger::initialize_logger;
use mdiff::{run_apply_with, run_extract};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    #[command(subcommand)]
    cmd: SubCommands,
}

#[derive(Subcommand, Debug, Clone)]
enum SubCommands {
    /// Apply changes from a JSON file to target files
    Apply(ApplyArgs),
    /// Extract content from files in a directory based on extensions
    Extract(ExtractArgs),
}

#[derive(Parser, Debug, Clone)]
struct ApplyArgs {
    #[arg(help = "JSON file with a \"changes\" array of {\"file_path\", \"content\"} objects")]
    json_file: PathBuf,
    #[arg(
        long,
        env = "MDIFF_BASE_DIR",
        help = "Directory that relative file paths resolve against (default: current directory)"
    )]
    base_dir: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
struct ExtractArgs {
    #[arg(
        long,
        env = "MDIFF_GITIGNORE",
        help = "Path to a custom .gitignore file. Defaults to .gitignore in <DIRECTORY_PATH>"
    )]
    gitignore: Option<PathBuf>,
    #[arg(help = "Directory to scan")]
    directory_path: PathBuf,
    #[arg(help = "Comma-separated list of file extensions (e.g. .js,.ts,.md)")]
    file_extensions: String,
}

fn main() -> ExitCode {
    let cli_args = CliArgs::parse();
    initialize_logger();

    match cli_args.cmd {
        SubCommands::Apply(args) => apply(args),
        SubCommands::Extract(args) => extract(args),
    }
}

fn apply(args: ApplyArgs) -> ExitCode {
    let config = ApplyConfig::new(&args.json_file, args.base_dir.as_deref());

    let applied = run_apply_with(&config, |path| {
        println!("Successfully applied changes to {}", path.display());
    });
    let report = match applied {
        Ok(report) => report,
        Err(e) => {
            error!("Error applying changes from '{}': {}", args.json_file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    if report.applied_count() > 0 {
        println!("Successfully applied {} file(s).", report.applied_count());
    } else if report.skipped > 0 {
        warn!("No file changes were actually applied from the JSON file.");
    }
    ExitCode::SUCCESS
}

fn extract(args: ExtractArgs) -> ExitCode {
    let config = match ExtractConfig::new(
        &args.directory_path,
        &args.file_extensions,
        args.gitignore.as_deref(),
    ) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let content = match run_extract(&config) {
        Ok(content) => content,
        Err(e) => {
            error!("Error extracting content: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut stdout = io::stdout().lock();
    if let Err(e) = stdout.write_all(&content).and_then(|_| stdout.flush()) {
        error!("Error writing extracted content: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
