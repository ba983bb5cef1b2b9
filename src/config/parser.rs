use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Environment variable overriding `http.timeout-secs`
pub const TIMEOUT_ENV: &str = "RA_TRANSCRIPTS_TIMEOUT";

/// Environment variable carrying a tracing filter directive
pub const LOG_ENV: &str = "RA_TRANSCRIPTS_LOG";

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use ra_transcripts::config::load_config;
///
/// let config = load_config(Path::new("ra-transcripts.toml")).unwrap();
/// println!("Timeout: {}s", config.http.timeout_secs);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Loads the configuration from an optional path and applies environment overrides
///
/// Without a path the built-in defaults are used. The result is validated
/// after the overrides are applied.
pub fn load_config_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate(&config)?;
    Ok(config)
}

/// Applies environment overrides using the given lookup function
///
/// Taking the lookup as a parameter keeps tests independent of the process
/// environment.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(TIMEOUT_ENV) {
        let secs = raw.trim().parse::<u64>().map_err(|_| {
            ConfigError::Validation(format!("{} must be a whole number of seconds, got '{}'", TIMEOUT_ENV, raw))
        })?;
        tracing::debug!("Timeout overridden from environment: {}s", secs);
        config.http.timeout_secs = secs;
    }

    Ok(())
}
