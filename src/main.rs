use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use std::io;
use std::path::PathBuf;
use xmlcheck::cli::check::CheckOptions;
use xmlcheck::cli::serve::ServeOptions;
use xmlcheck::{DocumentValidator, Result, XmlcheckConfig};

#[derive(Parser)]
#[command(name = "xmlcheck")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Numbering and option-integrity validator for editorial XML exports", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Config file (default: ./xmlcheck.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate XML files (directories are searched for *.xml)
    Check {
        /// Files or directories to validate
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output in JSON format
        #[arg(short, long)]
        json: bool,

        /// Exit non-zero when any issue is found
        #[arg(long)]
        strict: bool,
    },

    /// Serve the upload form
    Serve {
        /// Listen address (default: from config, 127.0.0.1)
        #[arg(long)]
        host: Option<String>,

        /// HTTP port (default: from config, 8501)
        #[arg(long)]
        port: Option<u16>,

        /// Open the form in a browser (requires ui feature)
        #[arg(long)]
        open: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    xmlcheck::utils::logging::init(cli.verbose);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to create tokio runtime");

    match runtime.block_on(run_async(cli)) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}", format!("Error: {:#}", e).red());
            std::process::exit(1);
        }
    }
}

async fn run_async(cli: Cli) -> Result<i32> {
    if let Commands::Completions { shell } = &cli.command {
        generate(*shell, &mut Cli::command(), "xmlcheck", &mut io::stdout());
        return Ok(0);
    }

    let cwd = std::env::current_dir()?;
    let config = XmlcheckConfig::resolve(cli.config.as_deref(), &cwd)?;

    match cli.command {
        Commands::Check {
            paths,
            output,
            json,
            strict,
        } => {
            let validator = DocumentValidator::from_config(&config);
            let options = CheckOptions {
                paths,
                output,
                json,
                strict,
            };
            let summary = xmlcheck::cli::check::run(&validator, &options)?;
            Ok(summary.exit_code(strict))
        }

        Commands::Serve { host, port, open } => {
            println!("{}", "🧰 Starting XML Editorial Validator...".cyan());
            xmlcheck::cli::serve::run(&config, ServeOptions { host, port, open }).await?;
            Ok(0)
        }

        Commands::Completions { .. } => Ok(0),
    }
}
