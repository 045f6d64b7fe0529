//! Command-line interface
//!
//! Behaviour is driven by the configuration file; the flags here only pick
//! that file and tune console output.

use clap::Parser;
use std::path::{Path, PathBuf};

/// ISP Service Checker - periodically logs download/upload speed and ping to CSV
#[derive(Parser, Debug, Clone)]
#[command(name = "isp-service-checker")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(
        short,
        long,
        env = "ISP_CHECKER_CONFIG",
        default_value = crate::defaults::DEFAULT_CONFIG_FILE
    )]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output (implies verbose, adds source locations)
    #[arg(long)]
    pub debug: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Write an example configuration file to the --config path and exit
    #[arg(long)]
    pub init_config: bool,
}

impl Cli {
    /// Whether the config path was left at its default.
    ///
    /// A missing default file means "use defaults"; a missing explicit file
    /// is an error.
    pub fn uses_default_config(&self) -> bool {
        self.config == Path::new(crate::defaults::DEFAULT_CONFIG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["isp-service-checker"]);
        assert_eq!(cli.config, PathBuf::from("config.toml"));
        assert!(cli.uses_default_config());
        assert!(!cli.verbose);
        assert!(!cli.debug);
        assert!(!cli.no_color);
        assert!(!cli.init_config);
    }

    #[test]
    fn test_explicit_config_path() {
        let cli = Cli::parse_from([
            "isp-service-checker",
            "--config",
            "/etc/isp/checker.toml",
            "--no-color",
        ]);
        assert_eq!(cli.config, PathBuf::from("/etc/isp/checker.toml"));
        assert!(!cli.uses_default_config());
        assert!(cli.no_color);
    }

    #[test]
    fn test_rejects_unknown_flags() {
        assert!(Cli::try_parse_from(["isp-service-checker", "--interval", "5"]).is_err());
    }
}
