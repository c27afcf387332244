mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    tracing::debug!("Loaded config from {:?}", path);
    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./frameseek.toml",
        "./config.toml",
        "~/.config/frameseek/config.toml",
        "/etc/frameseek/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // Return default config if no file found
    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    let index = &config.index;

    if index.default_frame_rate == 0 {
        anyhow::bail!("index.default_frame_rate cannot be 0");
    }

    if index.mjpeg_frame_rate == Some(0) {
        anyhow::bail!("index.mjpeg_frame_rate cannot be 0");
    }

    if index.max_depth == Some(0) {
        anyhow::bail!("index.max_depth cannot be 0 (the directory itself holds no segments)");
    }

    if index.max_files == Some(0) {
        tracing::warn!("index.max_files is 0, no segments will ever be loaded");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use frameseek_index::OutOfOrderPolicy;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(
            r#"
[index]
default_frame_rate = 8
mjpeg_frame_rate = 12
max_depth = 3
max_files = 500
follow_links = true
out_of_order = "reject"
"#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.index.default_frame_rate, 8);
        assert_eq!(config.index.mjpeg_rate(), 12);
        assert_eq!(config.index.max_depth, Some(3));
        assert_eq!(config.index.max_files, Some(500));
        assert!(config.index.follow_links);
        assert_eq!(config.index.out_of_order, OutOfOrderPolicy::Reject);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let file = write_config("");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.index.default_frame_rate, 5);
    }

    #[test]
    fn test_zero_rates_rejected() {
        let file = write_config("[index]\ndefault_frame_rate = 0\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("default_frame_rate"));

        let file = write_config("[index]\nmjpeg_frame_rate = 0\n");
        assert!(load_config(file.path()).is_err());

        let file = write_config("[index]\nmax_depth = 0\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let file = write_config("[index\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_explicit_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config_or_default(Some(&dir.path().join("nope.toml")));
        assert!(result.is_err());
    }
}
