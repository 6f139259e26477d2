use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use ::config::ConfigError;
use miette::{miette, IntoDiagnostic, Result};
use tracing_subscriber::EnvFilter;

use tanakh_mql::config::{ConvertConfig, Loader};
use tanakh_mql::{pipeline, transduce_str, MqlError};

/// Looked up in the working directory when no --config is given.
const LOCAL_CONFIG: &str = "tanakh-mql.toml";

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert OSIS-tagged Hebrew Bible XML into an Emdros MQL dump", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert the configured books into one MQL script
    Convert {
        /// Configuration file layered over the built-in defaults
        #[arg(long, value_name = "FILE", env = "TANAKH_MQL_CONFIG")]
        config: Option<PathBuf>,

        /// Directory holding <Book>.xml files
        #[arg(long, value_name = "DIR")]
        input_dir: Option<PathBuf>,

        /// Where to write the MQL script
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Records per CREATE OBJECTS transaction
        #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
        batch_size: Option<u32>,

        /// Directory receiving the cleaned copy of each book
        #[arg(long, value_name = "DIR", conflicts_with = "no_mirror")]
        mirror_dir: Option<PathBuf>,

        /// Do not write cleaned copies of the books
        #[arg(long)]
        no_mirror: bool,

        /// Books to convert, replacing the configured list
        books: Vec<String>,
    },

    /// Transduce a single book file and print the result
    #[command(arg_required_else_help = true)]
    Inspect {
        file: PathBuf,

        #[arg(long, value_enum, default_value_t = InspectFormat::Mql)]
        format: InspectFormat,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum InspectFormat {
    Mql,
    Json,
    Yaml,
}

fn init_logging() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| miette!("failed to install the log subscriber: {e}"))
}

fn path_value(path: PathBuf) -> String {
    path.to_string_lossy().into_owned()
}

/// Command-line settings that take precedence over every configuration file.
struct ConvertOverrides {
    config: Option<PathBuf>,
    input_dir: Option<PathBuf>,
    output: Option<PathBuf>,
    batch_size: Option<u32>,
    mirror_dir: Option<PathBuf>,
    no_mirror: bool,
    books: Vec<String>,
}

fn load_config(overrides: ConvertOverrides) -> Result<ConvertConfig, ConfigError> {
    let mut loader = match overrides.config {
        Some(path) => Loader::new().with_file(path),
        None => Loader::new().with_optional_file(LOCAL_CONFIG),
    };
    if let Some(dir) = overrides.input_dir {
        loader = loader.set_override("input.dir", path_value(dir))?;
    }
    if !overrides.books.is_empty() {
        loader = loader.set_override("input.books", overrides.books)?;
    }
    if let Some(path) = overrides.output {
        loader = loader.set_override("output.mql", path_value(path))?;
    }
    if let Some(n) = overrides.batch_size {
        loader = loader.set_override("output.batch_size", i64::from(n))?;
    }
    if let Some(dir) = overrides.mirror_dir {
        loader = loader.set_override("mirror.dir", path_value(dir))?;
    }
    if overrides.no_mirror {
        loader = loader.set_override("mirror.enabled", false)?;
    }
    loader.build()
}

fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            config,
            input_dir,
            output,
            batch_size,
            mirror_dir,
            no_mirror,
            books,
        } => {
            let config = load_config(ConvertOverrides {
                config,
                input_dir,
                output,
                batch_size,
                mirror_dir,
                no_mirror,
                books,
            })
            .map_err(MqlError::from)?;

            let summary = pipeline::convert(&config)?;
            for book in &summary.books {
                log::info!(
                    "{}: monads {}..{}, {} records, {} warnings",
                    book.name,
                    book.first_monad,
                    book.next_monad,
                    book.records,
                    book.warnings
                );
            }
            log::info!(
                "Wrote {} records covering {} monads to {}",
                summary.records,
                summary.monads(),
                config.output.mql.display()
            );
        }

        Commands::Inspect { file, format } => {
            let source = fs::read_to_string(&file).into_diagnostic()?;
            let name = file.display().to_string();
            let transduction = transduce_str(&source, &name)?;
            let rendered = match format {
                InspectFormat::Mql => transduction.to_mql().into_diagnostic()?,
                InspectFormat::Json => transduction.to_json().into_diagnostic()?,
                InspectFormat::Yaml => transduction.to_yaml().into_diagnostic()?,
            };
            print!("{rendered}");
        }
    }

    Ok(())
}
