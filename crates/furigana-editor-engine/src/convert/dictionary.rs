use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use reqwest::blocking::Client;

use super::format::{Token, render};
use super::{ConvertError, ConvertOptions, Converter, DictionarySource};
use crate::kana::{is_kana, to_hiragana};

/// The word list used when no other dictionary is configured.
pub const BUNDLED_DICTIONARY: &str = include_str!("../../assets/dict/basic.tsv");

/// Converter backed by a word list.
///
/// The dictionary is a UTF-8 file with one `surface<TAB>reading` pair per
/// line; blank lines and lines starting with `#` are skipped. Readings may be
/// written in hiragana or katakana. Text is segmented by longest match, so
/// `日本語` wins over `日本` when both are listed.
#[derive(Debug, Clone)]
pub struct DictionaryConverter {
    entries: HashMap<String, String>,
    /// Longest surface in characters, bounding the match window.
    longest: usize,
}

impl DictionaryConverter {
    /// Loads the dictionary from wherever `source` points. Blocks until the
    /// whole file has been read or fetched.
    pub fn open(source: &DictionarySource) -> Result<Self, ConvertError> {
        match source {
            DictionarySource::Bundled => Self::bundled(),
            DictionarySource::File(path) => Self::load(path),
            DictionarySource::Url(url) => Self::fetch(url),
        }
    }

    pub fn bundled() -> Result<Self, ConvertError> {
        Self::parse(BUNDLED_DICTIONARY, Path::new("<bundled>"))
    }

    /// Downloads a dictionary over HTTP. Any non-success status fails the
    /// load, as does a malformed body.
    pub fn fetch(url: &str) -> Result<Self, ConvertError> {
        let client = Client::builder()
            .build()
            .map_err(|source| fetch_error(url, source))?;
        Self::fetch_with(&client, url)
    }

    pub(crate) fn fetch_with(client: &Client, url: &str) -> Result<Self, ConvertError> {
        let content = client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(|source| fetch_error(url, source))?;
        let converter = Self::parse(&content, Path::new(url))?;
        log::info!("Fetched {} dictionary entries from {url}", converter.len());
        Ok(converter)
    }

    /// Loads a dictionary file. Loading is all-or-nothing: any malformed line
    /// fails the whole load.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConvertError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConvertError::DictionaryRead {
            path: path.to_path_buf(),
            source,
        })?;
        let converter = Self::parse(&content, path)?;
        log::info!(
            "Loaded {} dictionary entries from {}",
            converter.len(),
            path.display()
        );
        Ok(converter)
    }

    /// Parses dictionary text; `origin` is only used in error messages.
    pub fn parse(content: &str, origin: &Path) -> Result<Self, ConvertError> {
        let mut entries = Vec::new();
        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let malformed = |reason: &str| ConvertError::DictionaryFormat {
                path: origin.to_path_buf(),
                line: index + 1,
                reason: reason.to_string(),
            };
            let (surface, reading) = line
                .split_once('\t')
                .ok_or_else(|| malformed("expected surface and reading separated by a tab"))?;
            let (surface, reading) = (surface.trim(), reading.trim());
            if surface.is_empty() || reading.is_empty() {
                return Err(malformed("surface and reading must not be empty"));
            }
            if !reading.chars().all(is_kana) {
                return Err(malformed("reading must be written in kana"));
            }
            entries.push((surface, reading));
        }

        Self::build(entries, origin)
    }

    /// Builds a converter from in-memory pairs.
    pub fn from_entries<'a>(
        entries: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, ConvertError> {
        Self::build(entries, Path::new("<memory>"))
    }

    fn build<'a>(
        entries: impl IntoIterator<Item = (&'a str, &'a str)>,
        origin: &Path,
    ) -> Result<Self, ConvertError> {
        let mut map = HashMap::new();
        let mut longest = 0;
        for (surface, reading) in entries {
            if map.contains_key(surface) {
                log::debug!("Ignoring duplicate dictionary entry for {surface}");
                continue;
            }
            longest = longest.max(surface.chars().count());
            map.insert(surface.to_string(), to_hiragana(reading));
        }

        if map.is_empty() {
            return Err(ConvertError::EmptyDictionary(PathBuf::from(origin)));
        }

        Ok(Self {
            entries: map,
            longest,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reading of an exact surface form, in hiragana.
    pub fn reading(&self, surface: &str) -> Option<&str> {
        self.entries.get(surface).map(String::as_str)
    }

    /// Splits text into dictionary words and runs of unknown characters.
    pub(crate) fn tokenize<'a>(&'a self, text: &'a str) -> Vec<Token<'a>> {
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let chars = boundaries.len() - 1;

        let mut tokens = Vec::new();
        let mut unknown_start: Option<usize> = None;
        let mut i = 0;

        while i < chars {
            let window = self.longest.min(chars - i);
            let matched = (1..=window).rev().find_map(|len| {
                let surface = &text[boundaries[i]..boundaries[i + len]];
                self.entries
                    .get(surface)
                    .map(|reading| (len, surface, reading.as_str()))
            });

            match matched {
                Some((len, surface, reading)) => {
                    if let Some(start) = unknown_start.take() {
                        tokens.push(Token {
                            surface: &text[start..boundaries[i]],
                            reading: None,
                        });
                    }
                    tokens.push(Token {
                        surface,
                        reading: Some(reading),
                    });
                    i += len;
                }
                None => {
                    unknown_start.get_or_insert(boundaries[i]);
                    i += 1;
                }
            }
        }

        if let Some(start) = unknown_start {
            tokens.push(Token {
                surface: &text[start..],
                reading: None,
            });
        }
        tokens
    }
}

fn fetch_error(url: &str, source: reqwest::Error) -> ConvertError {
    ConvertError::DictionaryFetch {
        url: url.to_string(),
        source,
    }
}

impl Converter for DictionaryConverter {
    fn convert(&self, text: &str, options: &ConvertOptions) -> Result<String, ConvertError> {
        Ok(render(&self.tokenize(text), options))
    }
}
