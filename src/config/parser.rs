//! Configuration loading: TOML file, environment overrides and CLI flags

use crate::{
    cli::Cli,
    config::env::{EnvManager, ENV_PREFIX, ENV_SEPARATOR},
    error::{AppError, Result},
    models::Config,
};
use ::config::{Environment, File, FileFormat};
use std::collections::HashMap;
use std::path::Path;

/// Configuration parser that layers file, environment and CLI flags
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        EnvManager::load_env_file(self.cli.debug)?;

        let mut config = load_layers(&self.cli.config, !self.cli.uses_default_config(), None)?;

        self.apply_cli_overrides(&mut config);

        config.validate()?;

        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut Config) {
        if self.cli.no_color {
            config.output.enable_color = false;
        }

        // CLI-only flags
        config.verbose = self.cli.verbose || self.cli.debug;
        config.debug = self.cli.debug;
    }
}

/// Build a `Config` from the TOML file at `path` plus `ISP_CHECKER__*` variables.
///
/// `env` replaces the process environment when given; tests use it to stay
/// independent of each other.
pub fn load_layers(
    path: &Path,
    required: bool,
    env: Option<HashMap<String, String>>,
) -> Result<Config> {
    if required && !path.is_file() {
        return Err(AppError::config(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let settings = ::config::Config::builder()
        .add_source(File::from(path).format(FileFormat::Toml).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .try_parsing(true)
                .source(env),
        )
        .build()
        .map_err(|e| AppError::config(format!("Failed to read {}: {}", path.display(), e)))?;

    settings.try_deserialize::<Config>().map_err(|e| {
        AppError::config(format!("Invalid configuration in {}: {}", path.display(), e))
    })
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Interval: {}s", config.app.interval_seconds));
    summary.push(format!("Log File: {}", config.app.log_file.display()));
    summary.push(format!("Download URL: {}", config.provider.download_url));
    summary.push(format!("Upload URL: {}", config.provider.upload_url));
    summary.push(format!(
        "Transfer Sizes: {} B down / {} B up",
        config.provider.download_bytes, config.provider.upload_bytes
    ));
    summary.push(format!("Ping Samples: {}", config.provider.ping_samples));
    summary.push(format!("Provider Timeout: {}s", config.provider.timeout_seconds));
    summary.push(format!("Color Output: {}", config.output.enable_color));
    summary.push(format!("Log Format: {}", config.output.log_format));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    let overrides = EnvManager::active_overrides();
    if !overrides.is_empty() {
        summary.push(format!("Environment Overrides: {}", overrides.join(", ")));
    }

    summary.join("\n")
}
