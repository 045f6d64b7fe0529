//! `.env` loading and example configuration management

use crate::error::{AppError, Result};
use std::path::Path;

/// Prefix for `ISP_CHECKER__<SECTION>__<KEY>` overrides
pub const ENV_PREFIX: &str = "ISP_CHECKER";

/// Separator between prefix, section and key in override variables
pub const ENV_SEPARATOR: &str = "__";

/// Environment and example-file helper
pub struct EnvManager;

impl EnvManager {
    /// Load .env file if it exists
    pub fn load_env_file(debug: bool) -> Result<()> {
        if Path::new(".env").exists() {
            dotenv::from_filename(".env")
                .map_err(|e| AppError::config(format!("Failed to load .env file: {}", e)))?;

            if debug {
                println!("Loaded environment from .env file");
            }
        } else if debug {
            println!("No .env file found, using config file and process environment");
        }

        Ok(())
    }

    /// Names of the override variables currently set in the process environment
    pub fn active_overrides() -> Vec<String> {
        let prefix = format!("{}{}", ENV_PREFIX, ENV_SEPARATOR);
        let mut names: Vec<String> = std::env::vars()
            .map(|(key, _)| key)
            .filter(|key| key.starts_with(&prefix))
            .collect();
        names.sort();
        names
    }

    /// Example config.toml content
    pub fn create_example_config_content() -> String {
        format!(
            r#"# ISP Service Checker Configuration
#
# Every key is optional; the values below are the defaults.
# Any key can be overridden from the environment, e.g.
#   ISP_CHECKER__APP__INTERVAL_SECONDS=60

[app]
# Seconds to wait between speed tests
interval_seconds = {interval}
# CSV file the results are appended to (created with a header if missing)
log_file = "{log_file}"

[provider]
download_url = "{download_url}"
upload_url = "{upload_url}"
# Bytes transferred per test
download_bytes = {download_bytes}
upload_bytes = {upload_bytes}
# Latency probes averaged into ping_ms
ping_samples = {ping_samples}
# Upper bound for one complete speed test
timeout_seconds = {timeout}

[output]
enable_color = true
# console | json | compact
log_format = "console"
# trace | debug | info | warn | error | off
log_level = "info"
"#,
            interval = crate::defaults::DEFAULT_INTERVAL.as_secs(),
            log_file = crate::defaults::DEFAULT_LOG_FILE,
            download_url = crate::defaults::DEFAULT_DOWNLOAD_URL,
            upload_url = crate::defaults::DEFAULT_UPLOAD_URL,
            download_bytes = crate::defaults::DEFAULT_DOWNLOAD_BYTES,
            upload_bytes = crate::defaults::DEFAULT_UPLOAD_BYTES,
            ping_samples = crate::defaults::DEFAULT_PING_SAMPLES,
            timeout = crate::defaults::DEFAULT_PROVIDER_TIMEOUT.as_secs(),
        )
    }

    /// Write the example config, refusing to overwrite an existing file
    pub fn save_example_config(path: &Path) -> Result<()> {
        if path.exists() {
            return Err(AppError::config(format!(
                "Refusing to overwrite existing configuration file {}",
                path.display()
            )));
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::io(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        std::fs::write(path, Self::create_example_config_content()).map_err(|e| {
            AppError::io(format!("Failed to write example config {}: {}", path.display(), e))
        })?;

        Ok(())
    }
}
