use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use csv2mysql::{ConvertOptions, NarrowingPolicy, VarcharWidth, convert_file};
use tracing_subscriber::{EnvFilter, fmt};

const USAGE_EXIT: u8 = 2;

const HELP: &str = "\
Generates a MySQL CREATE TABLE statement and INSERT statements for a csv file.
The first row of the file must hold the column names. Column types are inferred
from the column contents. The statements are written to <name>.sql, where <name>
is the input file name without its extension.";

#[derive(Parser, Debug)]
#[command(name = "csv2mysql", about = HELP)]
struct Args {
    /// csv file to convert
    input: PathBuf,

    /// log progress to stderr
    #[arg(short)]
    verbose: bool,

    /// write the script here instead of <name>.sql
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// field delimiter; detected from the file when omitted
    #[arg(short, long, value_parser = parse_delimiter)]
    delimiter: Option<u8>,

    /// size text columns to their longest value instead of VARCHAR(255)
    #[arg(long)]
    fit_varchar: bool,

    /// type a column by all of its values instead of its last non-empty value
    #[arg(long)]
    strict_types: bool,
}

impl Args {
    fn options(&self) -> ConvertOptions {
        ConvertOptions {
            delimiter: self.delimiter,
            policy: if self.strict_types {
                NarrowingPolicy::Consistent
            } else {
                NarrowingPolicy::LastObservation
            },
            varchar_width: if self.fit_varchar {
                VarcharWidth::Fit
            } else {
                VarcharWidth::Fixed
            },
        }
    }
}

fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "\\t" | "tab" => Ok(b'\t'),
        _ if value.len() == 1 && value.is_ascii() => Ok(value.as_bytes()[0]),
        _ => Err(format!("expected a single ascii character, got '{}'", value)),
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();
}

fn program_name() -> String {
    env::args()
        .next()
        .as_deref()
        .and_then(|arg| Path::new(arg).file_name())
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| "csv2mysql".to_string())
}

fn main() -> ExitCode {
    // help and argument errors alike go to stderr with the usage status
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            eprint!("{}", err.render());
            return ExitCode::from(USAGE_EXIT);
        }
    };
    init_logging(args.verbose);

    match convert_file(&args.input, args.output.as_deref(), &args.options()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}: {}", program_name(), err);
            ExitCode::from(err.exit_code())
        }
    }
}
