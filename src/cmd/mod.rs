mod convert;
mod preview;
mod validate;

use clap::{CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::{generate, Shell};
use csvkit::Dialect;
use std::io;
use std::path::PathBuf;

const AFTER_HELP: &str = "\x1b[1mCommon workflows:\x1b[0m
  Convert a MySQL dump export to RFC 4180:
    csvkit convert export.tsv --from mysql --to rfc4180 -o export.csv

  Peek at the first rows of an unfamiliar file:
    csvkit preview data.csv --dialect excel

  Check a file parses cleanly before loading it elsewhere:
    csvkit validate data.csv --dialect postgres-csv

\x1b[1mMore info:\x1b[0m
  Run 'csvkit <command> --help' for command-specific options.
  Enable completions: csvkit completions <shell>";

#[derive(Parser)]
#[command(name = "csvkit")]
#[command(author = "Helge Sverre <helge.sverre@gmail.com>")]
#[command(version)]
#[command(about = "Dialect-parameterized CSV/TSV conversion, preview, and validation")]
#[command(after_help = AFTER_HELP)]
#[command(arg_required_else_help = true)]
#[command(max_term_width = 100)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

const INPUT_OUTPUT: &str = "Input/Output";
const BEHAVIOR: &str = "Behavior";

/// Recognized `--dialect`/`--from`/`--to` names (spec §3, §6).
pub(crate) fn resolve_dialect(name: &str) -> anyhow::Result<Dialect> {
    match name.to_ascii_lowercase().as_str() {
        "default" => Ok(csvkit::dialect::default_dialect()),
        "rfc4180" => Ok(csvkit::dialect::rfc4180()),
        "excel" => Ok(csvkit::dialect::excel()),
        "tdf" => Ok(csvkit::dialect::tdf()),
        "mysql" => Ok(csvkit::dialect::mysql()),
        "postgres-csv" | "postgresql-csv" => Ok(csvkit::dialect::postgresql_csv()),
        "postgres-text" | "postgresql-text" => Ok(csvkit::dialect::postgresql_text()),
        "oracle" => Ok(csvkit::dialect::oracle()),
        "informix" | "informix-unload" => Ok(csvkit::dialect::informix_unload()),
        "informix-csv" => Ok(csvkit::dialect::informix_unload_csv()),
        "mongodb-csv" => Ok(csvkit::dialect::mongodb_csv()),
        "mongodb-tsv" => Ok(csvkit::dialect::mongodb_tsv()),
        other => Err(anyhow::anyhow!(
            "unknown dialect {other:?} (try: default, rfc4180, excel, tdf, mysql, \
             postgres-csv, postgres-text, oracle, informix, informix-csv, \
             mongodb-csv, mongodb-tsv)"
        )),
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Re-write a delimited file from one dialect to another
    #[command(visible_alias = "c")]
    #[command(after_help = "\x1b[1mExamples:\x1b[0m
  csvkit convert dump.tsv --from mysql --to rfc4180 -o dump.csv
  csvkit convert - --from excel --to default < input.csv > output.csv")]
    Convert {
        /// Input file, or `-` for stdin
        #[arg(value_hint = ValueHint::FilePath, help_heading = INPUT_OUTPUT)]
        file: PathBuf,

        /// Output file, or stdout if omitted
        #[arg(short, long, value_hint = ValueHint::FilePath, help_heading = INPUT_OUTPUT)]
        output: Option<PathBuf>,

        /// Dialect the input is written in
        #[arg(long, default_value = "default", help_heading = INPUT_OUTPUT)]
        from: String,

        /// Dialect to write the output in
        #[arg(long, default_value = "default", help_heading = INPUT_OUTPUT)]
        to: String,

        /// Show a progress bar while converting
        #[arg(short, long, help_heading = BEHAVIOR)]
        progress: bool,
    },

    /// Print the first rows of a delimited file as a table
    #[command(visible_alias = "p")]
    #[command(after_help = "\x1b[1mExamples:\x1b[0m
  csvkit preview data.csv
  csvkit preview data.tsv --dialect mysql --rows 5")]
    Preview {
        /// Input file, or `-` for stdin
        #[arg(value_hint = ValueHint::FilePath, help_heading = INPUT_OUTPUT)]
        file: PathBuf,

        /// Dialect the input is written in
        #[arg(short, long, default_value = "default", help_heading = INPUT_OUTPUT)]
        dialect: String,

        /// Number of records to print
        #[arg(short, long, default_value_t = 10, help_heading = BEHAVIOR)]
        rows: u64,
    },

    /// Parse a delimited file strictly and report the first malformation
    #[command(visible_alias = "v")]
    #[command(after_help = "\x1b[1mExamples:\x1b[0m
  csvkit validate data.csv
  csvkit validate export.tsv --dialect postgres-text")]
    Validate {
        /// Input file, or `-` for stdin
        #[arg(value_hint = ValueHint::FilePath, help_heading = INPUT_OUTPUT)]
        file: PathBuf,

        /// Dialect the input is written in
        #[arg(short, long, default_value = "default", help_heading = INPUT_OUTPUT)]
        dialect: String,
    },

    /// Generate shell completion scripts
    #[command(after_help = "\x1b[1mInstallation:\x1b[0m
  Bash:
    csvkit completions bash > /etc/bash_completion.d/csvkit

  Zsh:
    csvkit completions zsh > \"${fpath[1]}/_csvkit\"

  Fish:
    csvkit completions fish > ~/.config/fish/completions/csvkit.fish")]
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Convert {
            file,
            output,
            from,
            to,
            progress,
        } => convert::run(file, output, from, to, progress),
        Commands::Preview { file, dialect, rows } => preview::run(file, dialect, rows),
        Commands::Validate { file, dialect } => validate::run(file, dialect),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "csvkit", &mut io::stdout());
            Ok(())
        }
    }
}
