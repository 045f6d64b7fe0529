//! Main application orchestration and execution

use crate::{
    cli::Cli,
    config::{display_config_summary, load_config, validate_config, EnvManager},
    error::Result,
    log_debug,
    logging::Logger,
    output::{ConsoleFormatter, CsvLog},
    provider::HttpSpeedProvider,
    scheduler::Scheduler,
    shutdown::ShutdownSignal,
    types::RunSummary,
};

/// Main application struct that coordinates all components
pub struct App {
    cli: Cli,
}

impl App {
    /// Create a new application instance with CLI configuration
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the application until a termination signal arrives
    pub async fn run(self) -> Result<Option<RunSummary>> {
        if self.cli.init_config {
            EnvManager::save_example_config(&self.cli.config)?;
            println!("Wrote example configuration to {}", self.cli.config.display());
            return Ok(None);
        }

        let config = load_config(self.cli.clone())?;
        let warnings = validate_config(&config)?;

        let logger = Logger::from_config(crate::PKG_NAME, &config);

        if config.debug {
            log_debug!(
                logger,
                "{} v{} built {} (commit {}, target {})",
                crate::PKG_NAME,
                crate::VERSION,
                crate::BUILD_TIME,
                crate::GIT_COMMIT.unwrap_or("unknown"),
                crate::TARGET_TRIPLE
            );
            log_debug!(
                logger,
                "Configuration summary:\n{}",
                display_config_summary(&config)
            );
        }

        if !warnings.is_empty() {
            eprintln!("Configuration Warnings:");
            for warning in &warnings {
                eprintln!("  {}", warning.format(config.output.enable_color));
            }
        }

        let console = ConsoleFormatter::new(config.output.enable_color);
        for line in console.startup_lines(&config.app.log_file, config.interval()) {
            println!("[{}] {}", crate::PKG_NAME, line);
        }

        let provider = HttpSpeedProvider::new(config.provider.clone())?;

        let shutdown = ShutdownSignal::new();
        shutdown.install_handlers(logger.clone())?;

        let scheduler = Scheduler::new(
            provider,
            CsvLog::new(&config.app.log_file),
            config.interval(),
            shutdown,
            logger,
        )
        .with_console(console);

        let summary = scheduler.run().await?;
        println!("[{}] {}", crate::PKG_NAME, console.summary_line(&summary));

        Ok(Some(summary))
    }
}
