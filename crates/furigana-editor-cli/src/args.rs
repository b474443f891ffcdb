use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Result, bail};
use furigana_editor_config::{Config, EditorVariant};
use furigana_editor_engine::DictionarySource;

pub const USAGE: &str = "Usage: furigana-editor [--global] [--dict <path-or-url>]";

/// Environment variable naming a dictionary file or URL.
pub const DICT_ENV: &str = "FURIGANA_DICT";

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Args {
    /// Re-convert the whole text on Enter instead of the current line
    pub global: bool,
    /// Dictionary path or `http(s)://` URL
    pub dict: Option<PathBuf>,
}

/// Parses arguments after the program name. `Ok(None)` means help was asked for.
pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Option<Args>> {
    let mut parsed = Args::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--global" => parsed.global = true,
            "--dict" => match args.next() {
                Some(path) => parsed.dict = Some(PathBuf::from(path)),
                None => bail!("--dict needs a path or URL"),
            },
            "-h" | "--help" => return Ok(None),
            other => bail!("Unknown argument '{other}'"),
        }
    }
    Ok(Some(parsed))
}

impl Args {
    /// `--global` wins over the config file.
    pub fn variant(&self, config: &Config) -> EditorVariant {
        if self.global {
            EditorVariant::Global
        } else {
            config.variant
        }
    }

    /// First of: `--dict`, `$FURIGANA_DICT`, the config file, the dictionary
    /// compiled into the binary.
    pub fn dictionary_source(&self, env: Option<OsString>, config: &Config) -> DictionarySource {
        self.dict
            .clone()
            .or_else(|| env.filter(|value| !value.is_empty()).map(PathBuf::from))
            .or_else(|| config.dictionary_path.clone())
            .map(DictionarySource::from_path)
            .unwrap_or_default()
    }
}
