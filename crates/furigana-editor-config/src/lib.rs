mod preferences;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use preferences::{Preferences, Theme};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Which editing surface the app starts with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorVariant {
    /// Convert only the line being confirmed.
    #[default]
    Block,
    /// Re-convert the whole text on every confirmed line.
    Global,
}

/// Script readings are written in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingScript {
    #[default]
    Hiragana,
    Katakana,
}

/// Settings from `config.toml`. The app never writes this file.
#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Local path or `http(s)://` URL of the dictionary
    pub dictionary_path: Option<PathBuf>,
    pub variant: EditorVariant,
    pub script: ReadingScript,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the dictionary path
        config.dictionary_path = config
            .dictionary_path
            .map(|path| expand_path(&path).unwrap_or(path));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        Self::load_from_path(Self::config_path())
    }

    pub fn config_path() -> PathBuf {
        config_dir().join("config.toml")
    }
}

/// `~/.config/furigana-editor`, tilde expanded.
pub fn config_dir() -> PathBuf {
    let config_dir = shellexpand::tilde("~/.config/furigana-editor");
    PathBuf::from(config_dir.as_ref())
}

/// Expands `~` and `$VAR` in `path`. `None` if a variable is undefined.
pub fn expand_path(path: &Path) -> Option<PathBuf> {
    let path_str = path.to_string_lossy();
    match shellexpand::full(&path_str) {
        Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/furigana-editor/config.toml"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.variant, EditorVariant::Block);
        assert_eq!(config.script, ReadingScript::Hiragana);
        assert!(config.dictionary_path.is_none());
    }

    #[test]
    fn test_variant_and_script_parse_lowercase() {
        let config: Config = toml::from_str(
            r#"
variant = "global"
script = "katakana"
"#,
        )
        .unwrap();

        assert_eq!(config.variant, EditorVariant::Global);
        assert_eq!(config.script, ReadingScript::Katakana);
    }

    #[test]
    fn test_unknown_variant_is_a_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "variant = \"sideways\"\n").unwrap();

        let result = Config::load_from_path(&config_file);

        assert!(matches!(result, Err(ConfigError::ConfigParseError { .. })));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = expand_path(Path::new("~/dict/basic.tsv")).unwrap();

        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("dict/basic.tsv"));
    }

    #[test]
    fn test_expand_path_with_absolute_path() {
        let path = PathBuf::from("/absolute/path");
        assert_eq!(expand_path(&path), Some(path));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_load_full_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_file,
            r#"
dictionary_path = "/usr/share/furigana/basic.tsv"
variant = "global"
script = "katakana"
"#,
        )
        .unwrap();

        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(
            loaded_config,
            Config {
                dictionary_path: Some(PathBuf::from("/usr/share/furigana/basic.tsv")),
                variant: EditorVariant::Global,
                script: ReadingScript::Katakana,
            }
        );
    }

    #[test]
    fn test_url_dictionary_path_is_kept_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_file,
            "dictionary_path = \"https://example.com/dict/basic.tsv\"\n",
        )
        .unwrap();

        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(
            config.dictionary_path,
            Some(PathBuf::from("https://example.com/dict/basic.tsv"))
        );
    }

    #[test]
    fn test_config_with_env_var_in_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_file,
            "dictionary_path = \"$FURIGANA_TEST_DICT_ROOT/basic.tsv\"\n",
        )
        .unwrap();
        unsafe {
            env::set_var("FURIGANA_TEST_DICT_ROOT", "/custom/dicts");
        }

        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(
            config.dictionary_path,
            Some(PathBuf::from("/custom/dicts/basic.tsv"))
        );

        unsafe {
            env::remove_var("FURIGANA_TEST_DICT_ROOT");
        }
    }
}
