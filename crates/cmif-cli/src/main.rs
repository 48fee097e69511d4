mod commands;
mod config;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::{EXIT_CONFIG_ERROR, EXIT_FAILURE, EXIT_MANIFEST_ERROR};
use config::CliConfig;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "cmif",
    version,
    about = "Validate and query CMIF artifact manifests"
)]
struct Cli {
    /// Path to a TOML config file (default: ~/.config/cmif/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate a manifest and report every violation.
    Validate {
        /// Path to manifest JSON file.
        #[arg(default_value = "manifest.json")]
        manifest: PathBuf,
    },
    /// Test a candidate version against the manifest's dependency trees for one name.
    Check {
        /// Path to manifest JSON file.
        manifest: PathBuf,
        /// Name of the top-level dependency to test.
        dependency: String,
        /// Candidate version, e.g. "1.2.3".
        version: String,
    },
    /// Summarize a manifest's identity, versions, and dependencies.
    Inspect {
        /// Path to manifest JSON file.
        #[arg(default_value = "manifest.json")]
        manifest: PathBuf,
    },
    /// Print the JSON Schema of the manifest format.
    Schema,
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
    /// Generate man pages in the specified directory.
    ManPages {
        /// Output directory for man pages.
        #[arg(default_value = "man")]
        dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("CMIF_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(msg) => {
            eprintln!("error: {msg}");
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };
    let limits = config.limits;
    let json_output = cli.json;

    let result = match cli.command {
        Commands::Validate { manifest } => commands::validate::run(&manifest, &limits, json_output),
        Commands::Check {
            manifest,
            dependency,
            version,
        } => commands::check::run(&manifest, &dependency, &version, &limits, json_output),
        Commands::Inspect { manifest } => commands::inspect::run(&manifest, json_output),
        Commands::Schema => commands::schema::run(),
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
        Commands::ManPages { dir } => commands::man_pages::run::<Cli>(&dir),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            let code = if msg.starts_with("failed to parse manifest")
                || msg.starts_with("failed to read manifest")
            {
                EXIT_MANIFEST_ERROR
            } else {
                EXIT_FAILURE
            };
            ExitCode::from(code)
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<CliConfig, String> {
    let config = match path {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::load_default()?,
    };
    config.with_env_overrides(|var| std::env::var(var).ok())
}
