#![warn(rust_2018_idioms)]

//! Runs one trial per selected backend on a trial file
//! and prints a runtime report for each.

use std::{
    env,
    fs::File,
    io::{self, BufReader},
    path::PathBuf,
};
use tracing::info;

use canon_bench::{
    backend::CanonOptions,
    parser::{parse_trial_file, TrialFile},
    partition::InsertMode,
    time, Algorithm, Error,
};

const USAGE: &str =
    "usage: canon-bench [-a <backend>]... [--no-canon] [--incremental] [<trial file>]";

#[derive(Debug, Default)]
struct Settings {
    /// Backends to run, all if none are given.
    algorithms: Vec<Algorithm>,
    /// Only compute the group, not the canonical form.
    no_canon: bool,
    /// Insert the colouring into the refiner's nest level by level.
    incremental: bool,
    /// Read from stdin if missing.
    input: Option<PathBuf>,
}

impl Settings {
    fn from_args<I: Iterator<Item = String>>(mut args: I) -> Result<Settings, Error> {
        let mut settings = Settings::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-a" | "--algorithm" => {
                    let name = args
                        .next()
                        .ok_or_else(|| Error::InvalidArgument(format!("{} needs a backend", arg)))?;
                    settings.algorithms.push(name.parse()?);
                }
                "--no-canon" => settings.no_canon = true,
                "--incremental" => settings.incremental = true,
                flag if flag.starts_with('-') => {
                    return Err(Error::InvalidArgument(format!("{}, {}", flag, USAGE)))
                }
                path => {
                    if settings.input.replace(PathBuf::from(path)).is_some() {
                        return Err(Error::InvalidArgument(format!("{}, {}", path, USAGE)));
                    }
                }
            }
        }

        if settings.algorithms.is_empty() {
            settings.algorithms = Algorithm::ALL.to_vec();
        }
        Ok(settings)
    }

    fn options(&self, trial_file: &TrialFile) -> CanonOptions {
        CanonOptions {
            get_canon: !self.no_canon,
            digraph: trial_file.directed,
            insert_mode: if self.incremental {
                InsertMode::Incremental
            } else {
                InsertMode::Bulk
            },
        }
    }
}

#[cfg(not(tarpaulin_include))]
fn read_trial_file(settings: &Settings) -> Result<TrialFile, Error> {
    match &settings.input {
        Some(path) => parse_trial_file(BufReader::new(File::open(path)?)),
        None => {
            let stdin = io::stdin();
            let lock = stdin.lock();
            parse_trial_file(lock)
        }
    }
}

#[cfg(not(tarpaulin_include))]
fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let settings = Settings::from_args(env::args().skip(1))?;
    time!(parse_time, trial_file, read_trial_file(&settings)?);
    info!(
        ?parse_time,
        vertices = trial_file.adjacency.len(),
        directed = trial_file.directed,
        "read trial file"
    );

    let options = settings.options(&trial_file);
    let input = trial_file.input();
    for algorithm in settings.algorithms.iter() {
        let report = algorithm.run(&input, options)?;
        info!(
            backend = algorithm.name(),
            classes = report.output.class_count(),
            "trial finished"
        );
        println!("{}", report);
    }

    Ok(())
}
