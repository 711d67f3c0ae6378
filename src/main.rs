use clap::{Parser as ClapParser, Subcommand};
use classad_lang::cli::{self, Access, CheckOptions, CliError, OutputFormat, ParseOptions};
use classad_lang::ParserMode;
use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::debug;

#[derive(ClapParser)]
#[command(name = "classad")]
#[command(about = "ClassAd - parse, validate and re-render ClassAd records")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse records and print them back
    Parse {
        /// File to read (reads stdin if not provided)
        file: Option<PathBuf>,

        /// Record text given inline instead of a file
        #[arg(short, long, conflicts_with = "file")]
        input: Option<String>,

        /// Record syntax to expect
        #[arg(short, long, value_enum, default_value_t = ParserMode::Auto)]
        mode: ParserMode,

        /// Which records to print
        #[arg(short, long, value_enum, default_value_t = Access::All)]
        access: Access,

        /// Output form
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Display)]
        format: OutputFormat,

        /// Read at most this many bytes of input
        #[arg(long)]
        max_bytes: Option<u64>,
    },

    /// Validate records without printing them
    Check {
        /// File to read (reads stdin if not provided)
        file: Option<PathBuf>,

        /// Record text given inline instead of a file
        #[arg(short, long, conflicts_with = "file")]
        input: Option<String>,

        /// Record syntax to expect
        #[arg(short, long, value_enum, default_value_t = ParserMode::Auto)]
        mode: ParserMode,

        /// Read at most this many bytes of input
        #[arg(long)]
        max_bytes: Option<u64>,
    },

    /// Print text as a ClassAd string literal
    Quote {
        text: String,

        /// Decode a string literal instead
        #[arg(short, long)]
        unquote: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse {
            file,
            input,
            mode,
            access,
            format,
            max_bytes,
        } => run_parse(file, input, mode, access, format, max_bytes),
        Commands::Check {
            file,
            input,
            mode,
            max_bytes,
        } => run_check(file, input, mode, max_bytes),
        Commands::Quote { text, unquote } => run_quote(&text, unquote),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

/// Inline text, the named file, or piped stdin, capped at `max_bytes`.
fn read_input(
    file: Option<PathBuf>,
    input: Option<String>,
    max_bytes: Option<u64>,
) -> Result<String, CliError> {
    let limit = max_bytes.unwrap_or(u64::MAX);
    if let Some(text) = input {
        let end = text
            .char_indices()
            .map(|(i, c)| i + c.len_utf8())
            .take_while(|end| (*end as u64) <= limit)
            .last()
            .unwrap_or(0);
        return Ok(text[..end].to_string());
    }

    let mut buffer = String::new();
    match file {
        Some(path) => {
            debug!(path = %path.display(), "reading ads from file");
            File::open(path)?.take(limit).read_to_string(&mut buffer)?;
        }
        None if !atty::is(atty::Stream::Stdin) => {
            io::stdin().take(limit).read_to_string(&mut buffer)?;
        }
        None => return Err(CliError::NoInput),
    }
    Ok(buffer)
}

fn run_parse(
    file: Option<PathBuf>,
    input: Option<String>,
    mode: ParserMode,
    access: Access,
    format: OutputFormat,
    max_bytes: Option<u64>,
) -> Result<(), CliError> {
    let options = ParseOptions {
        input: read_input(file, input, max_bytes)?,
        mode,
        access,
        format,
    };
    let output = cli::execute_parse(&options)?;
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}

fn run_check(
    file: Option<PathBuf>,
    input: Option<String>,
    mode: ParserMode,
    max_bytes: Option<u64>,
) -> Result<(), CliError> {
    let options = CheckOptions {
        input: read_input(file, input, max_bytes)?,
        mode,
    };
    let report = cli::execute_check(&options)?;
    println!(
        "{} ad(s), {} attribute(s): syntax is valid",
        report.ads, report.attributes
    );
    Ok(())
}

fn run_quote(text: &str, unquote: bool) -> Result<(), CliError> {
    let output = if unquote {
        cli::execute_unquote(text)?
    } else {
        cli::execute_quote(text)
    };
    println!("{}", output);
    Ok(())
}
