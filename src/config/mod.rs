mod types;

pub use types::*;

use anyhow::{Context, Result};
use mediatidy_av::AudioCodec;
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./mediatidy.toml",
        "./config.toml",
        "~/.config/mediatidy/config.toml",
        "/etc/mediatidy/config.toml",
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
    // Validate transcode config
    config
        .transcode
        .target_codec
        .parse::<AudioCodec>()
        .with_context(|| "Invalid transcode.target_codec")?;

    if config.transcode.video_extensions.is_empty() {
        anyhow::bail!("transcode.video_extensions cannot be empty");
    }

    if let Some(suffix) = &config.transcode.output_suffix {
        if suffix.is_empty() {
            anyhow::bail!("transcode.output_suffix cannot be empty");
        }
    }

    // Validate sort config
    let sort = &config.sort;
    if sort.allowed_extensions.is_empty() {
        anyhow::bail!("sort.allowed_extensions cannot be empty");
    }

    if sort.max_depth == 0 {
        anyhow::bail!("sort.max_depth must be at least 1");
    }

    if sort.movies_dir.is_empty() || sort.shows_dir.is_empty() {
        anyhow::bail!("sort.movies_dir and sort.shows_dir cannot be empty");
    }

    // Library folders inside the source would be walked again
    for dest in [sort.movies_path(), sort.shows_path()] {
        if dest.starts_with(&sort.source) {
            anyhow::bail!(
                "Library folder {:?} is inside the sort source {:?}",
                dest,
                sort.source
            );
        }
    }

    if !sort.source.exists() {
        tracing::warn!("Sort source does not exist: {:?}", sort.source);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.sort.movies_path(), Path::new("/mnt/usb1/Movies"));
        assert_eq!(config.sort.guesser, GuesserKind::Guessit);
        assert_eq!(config.transcode.target_codec, "eac3");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
[sort]
source = "/data/downloads"
library_root = "/data/library"
guesser = "builtin"

[transcode]
show_progress = false
"#,
        )
        .unwrap();

        assert_eq!(config.sort.guesser, GuesserKind::Builtin);
        assert_eq!(config.sort.shows_path(), Path::new("/data/library/Shows"));
        assert_eq!(config.sort.allowed_extensions.len(), 6);
        assert!(!config.transcode.show_progress);
        assert_eq!(config.transcode.skip_substring, "sample");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_rejects_unknown_codec() {
        let mut config = Config::default();
        config.transcode.target_codec = "mp3".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_rejects_library_inside_source() {
        let mut config = Config::default();
        config.sort.source = "/mnt/usb1".into();
        config.sort.library_root = "/mnt/usb1/sorted".into();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_rejects_empty_allow_list() {
        let mut config = Config::default();
        config.sort.allowed_extensions.clear();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mediatidy.toml");
        std::fs::write(&path, "[transcode]\ntarget_codec = \"ac3\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.transcode.target_codec, "ac3");
    }

    #[test]
    fn test_load_config_missing_file() {
        assert!(load_config(Path::new("/nonexistent/mediatidy.toml")).is_err());
    }
}
