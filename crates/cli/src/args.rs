//! Arguments shared by every subcommand

use clap::Args;
use std::path::PathBuf;

/// Global flags
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Path to apkbuilder.toml (default: discovered in . or .config/)
    #[arg(short, long, global = true, env = "APKBUILDER_CONFIG")]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

impl GlobalArgs {
    /// Default `tracing` filter directive for the verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level() {
        let mut args = GlobalArgs::default();
        assert_eq!(args.log_level(), "warn");
        args.verbose = 1;
        assert_eq!(args.log_level(), "info");
        args.verbose = 3;
        assert_eq!(args.log_level(), "debug");
    }
}
