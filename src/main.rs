use std::{path::Path, process::ExitCode};

use clap::Parser;
use nerc_rates::{
    cli::{Args, CheckArgs, Command, FileType, ValidateArgs},
    error::LoadError,
    github,
    loader::{self, Document, Loader},
    prelude::*,
};

fn main() -> ExitCode {
    tracing_subscriber::fmt().with_target(false).without_time().init();

    let args = Args::parse();
    let ok = match &args.command {
        Command::Validate(command) => validate(command, args.github),
        Command::Check(command) => check(command, args.github),
    };
    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

fn validate(args: &ValidateArgs, github: bool) -> bool {
    match args.file_type {
        FileType::Rates => match load(&loader::RATES, &args.file, args.url) {
            Ok(registry) => {
                println!("RATES VALIDATION OK [{} entries]", registry.len());
                true
            }
            Err(error) => report(&args.file, "Rates", &error, github),
        },
        FileType::Outages => match load(&loader::OUTAGES, &args.file, args.url) {
            Ok(registry) => {
                println!("OUTAGES VALIDATION OK [{} entries]", registry.len());
                true
            }
            Err(error) => report(&args.file, "Outages", &error, github),
        },
    }
}

fn check(args: &CheckArgs, github: bool) -> bool {
    let rates_source = source_name(args.rates_file.as_deref(), &loader::RATES, args.url);
    let outages_source = source_name(args.outages_file.as_deref(), &loader::OUTAGES, args.url);

    let rates = if args.url {
        loader::RATES.load_from_url(args.rates_file.as_deref())
    } else {
        loader::RATES.load_from_file(args.rates_file.as_deref().map(Path::new))
    };
    let outages = if args.url {
        loader::OUTAGES.load_from_url(args.outages_file.as_deref())
    } else {
        loader::OUTAGES.load_from_file(args.outages_file.as_deref().map(Path::new))
    };

    match (rates, outages) {
        (Ok(rates), Ok(outages)) => {
            println!("OK [{} rate entries, {} outage entries]", rates.len(), outages.len());
            true
        }
        (rates, outages) => {
            if let Err(error) = rates {
                report(rates_source, "Rates", &error, github);
            }
            if let Err(error) = outages {
                report(outages_source, "Outages", &error, github);
            }
            false
        }
    }
}

fn load<T: Document>(loader: &Loader<T>, source: &str, from_url: bool) -> Result<T, LoadError> {
    if from_url {
        loader.load_from_url(Some(source))
    } else {
        loader.load_from_file(Some(Path::new(source)))
    }
}

fn source_name<'a, T>(source: Option<&'a str>, loader: &Loader<T>, from_url: bool) -> &'a str {
    source.unwrap_or(if from_url { loader.default_url } else { loader.default_file })
}

fn report(file: &str, title: &str, error: &LoadError, github: bool) -> bool {
    if github {
        for line in github::annotations(file, title, error) {
            println!("{line}");
        }
    } else {
        error!(file, "{title} validation failed: {}", describe(error));
    }
    false
}

fn describe(error: &LoadError) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message = format!("{message}: {cause}");
        source = cause.source();
    }
    message
}
