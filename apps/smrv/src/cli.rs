//! Command line interface definition

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// smrv - Automated malware verification for mod registry uploads
#[derive(Parser)]
#[command(name = "smrv")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Automated malware verification for mod registry uploads")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Poll the registry and approve versions that scan clean
    Run,

    /// Verify specific versions once without approving them
    Verify {
        /// Registry version ids
        #[arg(required = true, value_name = "VERSION_ID")]
        version_ids: Vec<String>,
    },

    /// Verify recent versions of a page of mods without approving them
    Sample {
        /// Number of mods to take
        #[arg(long, default_value_t = 5)]
        limit: u32,

        /// Number of mods to skip
        #[arg(long, default_value_t = 5)]
        offset: u32,

        /// Versions to take per mod
        #[arg(long, default_value_t = 5)]
        versions: u32,
    },
}

impl Commands {
    /// Command name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Run => "run",
            Commands::Verify { .. } => "verify",
            Commands::Sample { .. } => "sample",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_sample_defaults() {
        let cli = Cli::try_parse_from(["smrv", "sample"]).unwrap();
        match cli.command {
            Commands::Sample {
                limit,
                offset,
                versions,
            } => assert_eq!((limit, offset, versions), (5, 5, 5)),
            _ => panic!("expected sample"),
        }
    }

    #[test]
    fn test_verify_requires_ids() {
        assert!(Cli::try_parse_from(["smrv", "verify"]).is_err());

        let cli = Cli::try_parse_from(["smrv", "--debug", "verify", "a", "b"]).unwrap();
        assert!(cli.global.debug);
        match cli.command {
            Commands::Verify { version_ids } => assert_eq!(version_ids, ["a", "b"]),
            _ => panic!("expected verify"),
        }
    }
}
