use std::process::ExitCode;
use std::time::Instant;

use log::debug;
use rayon::prelude::*;

use nixmodel::cli::{Cli, OutputFormat, VerbosityLevel};
use nixmodel::config::{Config, ConfigManager};
use nixmodel::output::{FileReport, Output};
use nixmodel::{File, FileMode, Implementation, ValidationOptions};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse_args();

    // nixmodel warnings on stderr; --verbose enables debug; RUST_LOG overrides
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_module("nixmodel", level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .init();

    if let Err(message) = cli.validate() {
        eprintln!("Error: {}", message);
        return Ok(ExitCode::from(2));
    }

    // bad config files and environment values are usage errors like bad flags
    let loaded = ConfigManager::load_config(&cli)
        .and_then(|config| Ok((config.implementation()?, config)));
    let (implementation, config) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: failed to load configuration: {}", e);
            return Ok(ExitCode::from(2));
        }
    };
    debug!("effective configuration: {:?}", config);

    let options = config.validation_options();
    let reports: Vec<FileReport> = cli
        .files
        .par_iter()
        .map(|path| validate_file(path, implementation, &options))
        .collect();

    let output = Output::new(verbosity(&config), OutputFormat::from(config.output.format));
    print!("{}", output.format_reports(&reports));

    let fail_on_warnings = config.validation.fail_on_warnings;
    if reports.iter().all(|report| report.passed(fail_on_warnings)) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn validate_file(
    path: &std::path::Path,
    implementation: Implementation,
    options: &ValidationOptions,
) -> FileReport {
    let start = Instant::now();
    let outcome = File::open_with(path, FileMode::ReadOnly, implementation).and_then(|mut file| {
        let result = file.validate_with(options)?;
        file.close()?;
        Ok(result)
    });
    match outcome {
        Ok(result) => FileReport::validated(path, result, start.elapsed()),
        Err(e) => FileReport::failed(path, e.to_string(), start.elapsed()),
    }
}

fn verbosity(config: &Config) -> VerbosityLevel {
    if config.output.quiet {
        VerbosityLevel::Quiet
    } else if config.output.verbose {
        VerbosityLevel::Verbose
    } else {
        VerbosityLevel::Normal
    }
}
