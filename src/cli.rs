use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::backend::Implementation;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum VerbosityLevel {
    /// Only show files with errors
    Quiet,
    /// Show one line per file plus a summary
    #[default]
    Normal,
    /// Also show every finding
    Verbose,
}

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
    Summary,
}

/// Open data files and check them against the model's rules
#[derive(Parser, Debug, Clone)]
#[command(name = "nixmodel")]
#[command(about = "Validate scientific data files against the entity model rules")]
#[command(version)]
pub struct Cli {
    /// Files to validate
    #[arg(required = true, help = "Data files to validate")]
    pub files: Vec<PathBuf>,

    /// Storage backend used to open the files
    #[arg(short = 'b', long = "backend", help = "Storage backend (memory, json)")]
    pub backend: Option<String>,

    /// Configuration file (TOML or JSON)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(short = 'f', long = "format", value_enum)]
    pub format: Option<OutputFormat>,

    /// Depth limit for source trees
    #[arg(long = "source-depth")]
    pub source_depth: Option<usize>,

    /// Depth limit for section trees
    #[arg(long = "section-depth")]
    pub section_depth: Option<usize>,

    /// Treat warnings as failures
    #[arg(long = "fail-on-warnings")]
    pub fail_on_warnings: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", help = "Enable verbose output")]
    pub verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Quiet mode",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Check arguments that clap cannot check on its own
    pub fn validate(&self) -> Result<(), String> {
        if let Some(backend) = &self.backend {
            backend
                .parse::<Implementation>()
                .map_err(|e| e.to_string())?;
        }
        if let Some(missing) = self.files.iter().find(|path| !path.exists()) {
            return Err(format!("File does not exist: {}", missing.display()));
        }
        Ok(())
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else if self.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }
}
