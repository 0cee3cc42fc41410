use crate::config::types::FileConfig;
use crate::config::validation::validate_fetcher_config;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses an optional configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(FileConfig)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use catalog_crawler::config::load_file_config;
///
/// let file = load_file_config(Path::new("crawler.toml")).unwrap();
/// println!("Output: {}", file.output.path.display());
/// ```
pub fn load_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    load_file_config_with_hash(path).map(|(config, _)| config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so runs can be correlated with the exact tuning used.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    Ok(hash_content(&std::fs::read_to_string(path)?))
}

/// Loads a configuration file and returns both the config and its hash
///
/// The file is read once, so the hash always describes the parsed content.
pub fn load_file_config_with_hash(path: &Path) -> Result<(FileConfig, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let config: FileConfig = toml::from_str(&content)?;
    validate_fetcher_config(&config.fetcher)?;

    Ok((config, hash_content(&content)))
}

fn hash_content(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
