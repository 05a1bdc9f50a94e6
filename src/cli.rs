use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
pub struct Args {
    /// Emit GitHub workflow annotations for failures.
    #[clap(short, long)]
    pub github: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate a single rates or outages file.
    Validate(ValidateArgs),

    /// Validate the rates and outages files together.
    Check(CheckArgs),
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// Treat the file argument as a URL.
    #[clap(short, long)]
    pub url: bool,

    /// Type of file to validate.
    #[clap(short = 't', long = "type", value_enum)]
    pub file_type: FileType,

    /// Path (or URL) of the file to validate.
    pub file: String,
}

#[derive(Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum FileType {
    Rates,
    Outages,
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Treat the file arguments as URLs.
    #[clap(short, long)]
    pub url: bool,

    /// Rates file to validate; defaults to `rates.yaml`, or the upstream
    /// repository in URL mode.
    #[clap(long, env = "RATES_FILE")]
    pub rates_file: Option<String>,

    /// Outages file to validate; defaults to `outages.yaml`, or the upstream
    /// repository in URL mode.
    #[clap(long, env = "OUTAGES_FILE")]
    pub outages_file: Option<String>,
}
